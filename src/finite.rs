//! Serialization guard that refuses NaN and infinities.
//!
//! serde_json writes non-finite floats as `null`, which would silently turn a
//! broken payload into a plausible one. [`Finite`] wraps any `Serialize` value
//! and forwards every call to the real serializer, except that a non-finite
//! `f32`/`f64` anywhere in the tree becomes a serialization error.

use serde::ser::{
    self, Serialize, SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant,
    SerializeTuple, SerializeTupleStruct, SerializeTupleVariant, Serializer,
};

/// Serializes `T`, failing on NaN or ±∞.
pub(crate) struct Finite<'a, T: ?Sized>(pub(crate) &'a T);

impl<T: Serialize + ?Sized> Serialize for Finite<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(Guard(serializer))
    }
}

fn non_finite<E: ser::Error>(v: impl std::fmt::Display) -> E {
    E::custom(format_args!("{v} cannot be represented in JSON"))
}

// One wrapper for the serializer and for each of its compound states.
struct Guard<S>(S);

impl<S: Serializer> Serializer for Guard<S> {
    type Ok = S::Ok;
    type Error = S::Error;
    type SerializeSeq = Guard<S::SerializeSeq>;
    type SerializeTuple = Guard<S::SerializeTuple>;
    type SerializeTupleStruct = Guard<S::SerializeTupleStruct>;
    type SerializeTupleVariant = Guard<S::SerializeTupleVariant>;
    type SerializeMap = Guard<S::SerializeMap>;
    type SerializeStruct = Guard<S::SerializeStruct>;
    type SerializeStructVariant = Guard<S::SerializeStructVariant>;

    fn serialize_f32(self, v: f32) -> Result<S::Ok, S::Error> {
        if v.is_finite() { self.0.serialize_f32(v) } else { Err(non_finite(v)) }
    }

    fn serialize_f64(self, v: f64) -> Result<S::Ok, S::Error> {
        if v.is_finite() { self.0.serialize_f64(v) } else { Err(non_finite(v)) }
    }

    fn serialize_bool(self, v: bool) -> Result<S::Ok, S::Error> { self.0.serialize_bool(v) }
    fn serialize_i8(self, v: i8) -> Result<S::Ok, S::Error> { self.0.serialize_i8(v) }
    fn serialize_i16(self, v: i16) -> Result<S::Ok, S::Error> { self.0.serialize_i16(v) }
    fn serialize_i32(self, v: i32) -> Result<S::Ok, S::Error> { self.0.serialize_i32(v) }
    fn serialize_i64(self, v: i64) -> Result<S::Ok, S::Error> { self.0.serialize_i64(v) }
    fn serialize_i128(self, v: i128) -> Result<S::Ok, S::Error> { self.0.serialize_i128(v) }
    fn serialize_u8(self, v: u8) -> Result<S::Ok, S::Error> { self.0.serialize_u8(v) }
    fn serialize_u16(self, v: u16) -> Result<S::Ok, S::Error> { self.0.serialize_u16(v) }
    fn serialize_u32(self, v: u32) -> Result<S::Ok, S::Error> { self.0.serialize_u32(v) }
    fn serialize_u64(self, v: u64) -> Result<S::Ok, S::Error> { self.0.serialize_u64(v) }
    fn serialize_u128(self, v: u128) -> Result<S::Ok, S::Error> { self.0.serialize_u128(v) }
    fn serialize_char(self, v: char) -> Result<S::Ok, S::Error> { self.0.serialize_char(v) }
    fn serialize_str(self, v: &str) -> Result<S::Ok, S::Error> { self.0.serialize_str(v) }
    fn serialize_bytes(self, v: &[u8]) -> Result<S::Ok, S::Error> { self.0.serialize_bytes(v) }
    fn serialize_none(self) -> Result<S::Ok, S::Error> { self.0.serialize_none() }
    fn serialize_unit(self) -> Result<S::Ok, S::Error> { self.0.serialize_unit() }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<S::Ok, S::Error> {
        self.0.serialize_some(&Finite(value))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<S::Ok, S::Error> {
        self.0.serialize_unit_struct(name)
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        index: u32,
        variant: &'static str,
    ) -> Result<S::Ok, S::Error> {
        self.0.serialize_unit_variant(name, index, variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<S::Ok, S::Error> {
        self.0.serialize_newtype_struct(name, &Finite(value))
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<S::Ok, S::Error> {
        self.0.serialize_newtype_variant(name, index, variant, &Finite(value))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, S::Error> {
        self.0.serialize_seq(len).map(Guard)
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, S::Error> {
        self.0.serialize_tuple(len).map(Guard)
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, S::Error> {
        self.0.serialize_tuple_struct(name, len).map(Guard)
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, S::Error> {
        self.0.serialize_tuple_variant(name, index, variant, len).map(Guard)
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, S::Error> {
        self.0.serialize_map(len).map(Guard)
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<Self::SerializeStruct, S::Error> {
        self.0.serialize_struct(name, len).map(Guard)
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, S::Error> {
        self.0.serialize_struct_variant(name, index, variant, len).map(Guard)
    }

    fn is_human_readable(&self) -> bool { self.0.is_human_readable() }
}

impl<S: SerializeSeq> SerializeSeq for Guard<S> {
    type Ok = S::Ok;
    type Error = S::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), S::Error> {
        self.0.serialize_element(&Finite(value))
    }

    fn end(self) -> Result<S::Ok, S::Error> { self.0.end() }
}

impl<S: SerializeTuple> SerializeTuple for Guard<S> {
    type Ok = S::Ok;
    type Error = S::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), S::Error> {
        self.0.serialize_element(&Finite(value))
    }

    fn end(self) -> Result<S::Ok, S::Error> { self.0.end() }
}

impl<S: SerializeTupleStruct> SerializeTupleStruct for Guard<S> {
    type Ok = S::Ok;
    type Error = S::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), S::Error> {
        self.0.serialize_field(&Finite(value))
    }

    fn end(self) -> Result<S::Ok, S::Error> { self.0.end() }
}

impl<S: SerializeTupleVariant> SerializeTupleVariant for Guard<S> {
    type Ok = S::Ok;
    type Error = S::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), S::Error> {
        self.0.serialize_field(&Finite(value))
    }

    fn end(self) -> Result<S::Ok, S::Error> { self.0.end() }
}

impl<S: SerializeMap> SerializeMap for Guard<S> {
    type Ok = S::Ok;
    type Error = S::Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), S::Error> {
        self.0.serialize_key(&Finite(key))
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), S::Error> {
        self.0.serialize_value(&Finite(value))
    }

    fn end(self) -> Result<S::Ok, S::Error> { self.0.end() }
}

impl<S: SerializeStruct> SerializeStruct for Guard<S> {
    type Ok = S::Ok;
    type Error = S::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), S::Error> {
        self.0.serialize_field(key, &Finite(value))
    }

    fn skip_field(&mut self, key: &'static str) -> Result<(), S::Error> { self.0.skip_field(key) }

    fn end(self) -> Result<S::Ok, S::Error> { self.0.end() }
}

impl<S: SerializeStructVariant> SerializeStructVariant for Guard<S> {
    type Ok = S::Ok;
    type Error = S::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), S::Error> {
        self.0.serialize_field(key, &Finite(value))
    }

    fn skip_field(&mut self, key: &'static str) -> Result<(), S::Error> { self.0.skip_field(key) }

    fn end(self) -> Result<S::Ok, S::Error> { self.0.end() }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Serialize;
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct Reading {
        sensor: &'static str,
        values: Vec<Option<f32>>,
    }

    #[derive(Serialize)]
    enum Sample {
        Point { x: f64 },
    }

    #[test]
    fn finite_values_pass_through_unchanged() {
        let reading = Reading { sensor: "t1", values: vec![Some(1.5), None] };
        assert_eq!(
            serde_json::to_value(Finite(&reading)).unwrap(),
            json!({ "sensor": "t1", "values": [1.5, null] }),
        );
    }

    #[test]
    fn top_level_nan_is_rejected() {
        let err = serde_json::to_value(Finite(&f64::NAN)).unwrap_err();
        assert!(err.to_string().contains("NaN"), "{err}");
    }

    #[test]
    fn nested_infinity_is_rejected() {
        let reading = Reading { sensor: "t1", values: vec![Some(2.0), Some(f32::INFINITY)] };
        assert!(serde_json::to_value(Finite(&reading)).is_err());

        let mut ratios = BTreeMap::new();
        ratios.insert("ratio", f64::NEG_INFINITY);
        assert!(serde_json::to_vec(&Finite(&ratios)).is_err());

        assert!(serde_json::to_value(Finite(&Sample::Point { x: f64::NAN })).is_err());
    }
}
