//! Structural dump of `Serialize` values.
//!
//! The value is serialized straight into the [`Renderer`], so the depth and
//! length limits apply while serde walks it: nothing past the limits is
//! built, and a sequence stops being walked once output is cut.

use std::fmt;

use serde::ser::{self, Serialize};

use super::adapters::Opaque;
use super::{Render, Renderer, VOID};

/// Structural dump of every field of a `Serialize` value.
///
/// Structs render as `Name{field=value, ...}` in declaration order, tuple
/// structs as `Name(a, b)`, sequences as `[a, b]` and maps as `{k=v}` with
/// entries sorted by their rendered text. Numbers keep their exact value,
/// including 128-bit integers and non-finite floats. A value whose
/// `Serialize` impl fails renders as [`Opaque`].
pub struct Structural<'a, T: ?Sized>(pub &'a T);

impl<T: Serialize + ?Sized> Render for Structural<'_, T> {
    fn render(&self, out: &mut Renderer<'_>) {
        if out.is_cut() {
            return;
        }
        let mark = out.mark();
        match self.0.serialize(Dump { out: &mut *out }) {
            Ok(()) | Err(DumpError::Truncated) => {}
            Err(DumpError::Custom(e)) => {
                tracing::trace!(error = %e, "structural dump failed, rendering opaque");
                out.rewind(mark);
                Opaque(self.0).render(out);
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum DumpError {
    /// Output reached the length limit; stops the walk early.
    #[error("render limit reached")]
    Truncated,

    #[error("{0}")]
    Custom(String),
}

impl ser::Error for DumpError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        DumpError::Custom(msg.to_string())
    }
}

struct Dump<'r, 'a> {
    out: &'r mut Renderer<'a>,
}

impl<'r, 'a> Dump<'r, 'a> {
    fn open(self, name: &str, open: &'static str, close: &'static str) -> Group<'r, 'a> {
        self.out.text(name);
        self.out.text(open);
        Group {
            out: self.out,
            first: true,
            close,
        }
    }

    fn display(self, value: impl fmt::Display) -> Result<(), DumpError> {
        self.out.display(value);
        Ok(())
    }
}

impl<'r, 'a> ser::Serializer for Dump<'r, 'a> {
    type Ok = ();
    type Error = DumpError;

    type SerializeSeq = Group<'r, 'a>;
    type SerializeTuple = Group<'r, 'a>;
    type SerializeTupleStruct = Group<'r, 'a>;
    type SerializeTupleVariant = Group<'r, 'a>;
    type SerializeMap = Entries<'r, 'a>;
    type SerializeStruct = Group<'r, 'a>;
    type SerializeStructVariant = Group<'r, 'a>;

    fn serialize_bool(self, v: bool) -> Result<(), DumpError> {
        self.display(v)
    }

    fn serialize_i8(self, v: i8) -> Result<(), DumpError> {
        self.display(v)
    }

    fn serialize_i16(self, v: i16) -> Result<(), DumpError> {
        self.display(v)
    }

    fn serialize_i32(self, v: i32) -> Result<(), DumpError> {
        self.display(v)
    }

    fn serialize_i64(self, v: i64) -> Result<(), DumpError> {
        self.display(v)
    }

    fn serialize_i128(self, v: i128) -> Result<(), DumpError> {
        self.display(v)
    }

    fn serialize_u8(self, v: u8) -> Result<(), DumpError> {
        self.display(v)
    }

    fn serialize_u16(self, v: u16) -> Result<(), DumpError> {
        self.display(v)
    }

    fn serialize_u32(self, v: u32) -> Result<(), DumpError> {
        self.display(v)
    }

    fn serialize_u64(self, v: u64) -> Result<(), DumpError> {
        self.display(v)
    }

    fn serialize_u128(self, v: u128) -> Result<(), DumpError> {
        self.display(v)
    }

    fn serialize_f32(self, v: f32) -> Result<(), DumpError> {
        self.display(v)
    }

    fn serialize_f64(self, v: f64) -> Result<(), DumpError> {
        self.display(v)
    }

    fn serialize_char(self, v: char) -> Result<(), DumpError> {
        self.display(v)
    }

    fn serialize_str(self, v: &str) -> Result<(), DumpError> {
        self.out.text(v);
        Ok(())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<(), DumpError> {
        self.out.list("[", "]", v.iter());
        Ok(())
    }

    fn serialize_none(self) -> Result<(), DumpError> {
        self.out.text(VOID);
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), DumpError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), DumpError> {
        self.out.text(VOID);
        Ok(())
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<(), DumpError> {
        self.out.text(name);
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<(), DumpError> {
        self.out.text(variant);
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<(), DumpError> {
        let mut group = self.open(name, "(", ")");
        group.element(value)?;
        ser::SerializeTuple::end(group)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<(), DumpError> {
        ser::Serializer::serialize_newtype_struct(self, variant, value)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Group<'r, 'a>, DumpError> {
        Ok(self.open("", "[", "]"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Group<'r, 'a>, DumpError> {
        Ok(self.open("", "(", ")"))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Group<'r, 'a>, DumpError> {
        Ok(self.open(name, "(", ")"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Group<'r, 'a>, DumpError> {
        Ok(self.open(variant, "(", ")"))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Entries<'r, 'a>, DumpError> {
        Ok(Entries {
            out: self.out,
            entries: Vec::with_capacity(len.unwrap_or(0)),
            key: None,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Group<'r, 'a>, DumpError> {
        Ok(self.open(name, "{", "}"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Group<'r, 'a>, DumpError> {
        Ok(self.open(variant, "{", "}"))
    }
}

/// Sequences, tuples and structs: elements written in order.
struct Group<'r, 'a> {
    out: &'r mut Renderer<'a>,
    first: bool,
    close: &'static str,
}

impl Group<'_, '_> {
    fn separator(&mut self) -> Result<(), DumpError> {
        if self.out.is_cut() {
            return Err(DumpError::Truncated);
        }
        if !self.first {
            self.out.text(", ");
        }
        self.first = false;
        Ok(())
    }

    fn element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), DumpError> {
        self.separator()?;
        self.out.value(&Structural(value));
        Ok(())
    }

    fn field<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), DumpError> {
        self.separator()?;
        self.out.text(key);
        self.out.text("=");
        self.out.value(&Structural(value));
        Ok(())
    }

    fn close(self) -> Result<(), DumpError> {
        self.out.text(self.close);
        Ok(())
    }
}

impl ser::SerializeSeq for Group<'_, '_> {
    type Ok = ();
    type Error = DumpError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), DumpError> {
        self.element(value)
    }

    fn end(self) -> Result<(), DumpError> {
        self.close()
    }
}

impl ser::SerializeTuple for Group<'_, '_> {
    type Ok = ();
    type Error = DumpError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), DumpError> {
        self.element(value)
    }

    fn end(self) -> Result<(), DumpError> {
        self.close()
    }
}

impl ser::SerializeTupleStruct for Group<'_, '_> {
    type Ok = ();
    type Error = DumpError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), DumpError> {
        self.element(value)
    }

    fn end(self) -> Result<(), DumpError> {
        self.close()
    }
}

impl ser::SerializeTupleVariant for Group<'_, '_> {
    type Ok = ();
    type Error = DumpError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), DumpError> {
        self.element(value)
    }

    fn end(self) -> Result<(), DumpError> {
        self.close()
    }
}

impl ser::SerializeStruct for Group<'_, '_> {
    type Ok = ();
    type Error = DumpError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), DumpError> {
        self.field(key, value)
    }

    fn end(self) -> Result<(), DumpError> {
        self.close()
    }
}

impl ser::SerializeStructVariant for Group<'_, '_> {
    type Ok = ();
    type Error = DumpError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), DumpError> {
        self.field(key, value)
    }

    fn end(self) -> Result<(), DumpError> {
        self.close()
    }
}

/// Maps: entries rendered separately, then written sorted.
struct Entries<'r, 'a> {
    out: &'r mut Renderer<'a>,
    entries: Vec<String>,
    key: Option<String>,
}

impl ser::SerializeMap for Entries<'_, '_> {
    type Ok = ();
    type Error = DumpError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), DumpError> {
        if self.out.is_cut() {
            return Err(DumpError::Truncated);
        }
        self.key = Some(self.out.capture(|o| o.value(&Structural(key))));
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), DumpError> {
        let key = self.key.take().unwrap_or_default();
        let entry = self.out.capture(|o| {
            o.text(&key);
            o.text("=");
            o.value(&Structural(value));
        });
        self.entries.push(entry);
        Ok(())
    }

    fn end(self) -> Result<(), DumpError> {
        self.out.sorted("{", "}", self.entries);
        Ok(())
    }
}
