//! Deserialize AMF0 data to a Rust data structure.

use std::io::{self, Seek};

use byteorder::{BigEndian, ReadBytesExt};
use bytes::{Buf, Bytes};
use num_traits::FromPrimitive;
use rtmplex_bytes_util::{BytesCursorExt, StringCow};
use serde::de::{EnumAccess, IntoDeserializer, MapAccess, SeqAccess, VariantAccess};

use crate::{Amf0Error, Amf0Marker, Amf0Value};

/// Deserialize a value from bytes.
pub fn from_bytes<'de, T>(bytes: Bytes) -> crate::Result<T>
where
    T: serde::de::Deserialize<'de>,
{
    let mut de = Deserializer::new(bytes);
    let value = T::deserialize(&mut de)?;
    Ok(value)
}

/// Deserializer for AMF0 data.
pub struct Deserializer {
    reader: io::Cursor<Bytes>,
}

impl Deserializer {
    /// Create a new deserializer from a reader.
    pub fn new(bytes: Bytes) -> Self {
        Deserializer {
            reader: io::Cursor::new(bytes),
        }
    }

    fn expect_marker(&mut self, expect: &'static [Amf0Marker]) -> Result<(), Amf0Error> {
        let marker = self.reader.read_u8()?;
        let marker = Amf0Marker::from_u8(marker).ok_or(Amf0Error::UnknownMarker(marker))?;

        if !expect.contains(&marker) {
            Err(Amf0Error::UnexpectedType {
                expected: expect,
                got: marker,
            })
        } else {
            Ok(())
        }
    }

    fn read_number(&mut self) -> Result<f64, Amf0Error> {
        let marker = self.reader.read_u8()?;
        let marker = Amf0Marker::from_u8(marker).ok_or(Amf0Error::UnknownMarker(marker))?;

        if marker != Amf0Marker::Number && marker != Amf0Marker::Date {
            return Err(Amf0Error::UnexpectedType {
                expected: &[Amf0Marker::Number, Amf0Marker::Date],
                got: marker,
            });
        }

        let number = self.reader.read_f64::<BigEndian>()?;

        if marker == Amf0Marker::Date {
            // Skip the timezone
            self.reader.read_i16::<BigEndian>()?;
        }

        Ok(number)
    }

    fn read_normal_string<'de>(&mut self) -> Result<StringCow<'de>, Amf0Error> {
        let len = self.reader.read_u16::<BigEndian>()? as usize;

        Ok(StringCow::from_bytes(self.reader.extract_bytes(len)?.try_into()?))
    }

    fn read_string<'de>(&mut self) -> Result<StringCow<'de>, Amf0Error> {
        let marker = self.reader.read_u8()?;
        let marker = Amf0Marker::from_u8(marker).ok_or(Amf0Error::UnknownMarker(marker))?;

        let len = if marker == Amf0Marker::String {
            self.reader.read_u16::<BigEndian>()? as usize
        } else if marker == Amf0Marker::LongString || marker == Amf0Marker::XmlDocument {
            self.reader.read_u32::<BigEndian>()? as usize
        } else {
            return Err(Amf0Error::UnexpectedType {
                expected: &[Amf0Marker::String, Amf0Marker::LongString],
                got: marker,
            });
        };

        let s = StringCow::from_bytes(self.reader.extract_bytes(len)?.try_into()?);
        Ok(s)
    }
}

impl Deserializer {
    /// Deserialize the remaining values from the reader and return them as a vector of [`Amf0Value`]s.
    pub fn deserialize_all<'de>(&mut self) -> Result<Vec<Amf0Value<'de>>, Amf0Error> {
        let mut values = Vec::new();

        while self.reader.has_remaining() {
            let value = serde::de::Deserialize::deserialize(&mut *self)?;
            values.push(value);
        }

        Ok(values)
    }

    /// Check if there are remaining bytes to read in this deserializer.
    pub fn has_remaining(&self) -> bool {
        self.reader.has_remaining()
    }
}

impl<'de> serde::de::Deserializer<'de> for &mut Deserializer {
    type Error = Amf0Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        let marker = self.reader.read_u8()?;
        let marker = Amf0Marker::from_u8(marker).ok_or(Amf0Error::UnknownMarker(marker))?;

        self.reader.seek_relative(-1)?;

        match marker {
            Amf0Marker::Boolean => self.deserialize_bool(visitor),
            Amf0Marker::Number | Amf0Marker::Date => self.deserialize_f64(visitor),
            Amf0Marker::String | Amf0Marker::LongString | Amf0Marker::XmlDocument => self.deserialize_str(visitor),
            Amf0Marker::Null | Amf0Marker::Undefined => self.deserialize_unit(visitor),
            Amf0Marker::Object | Amf0Marker::TypedObject | Amf0Marker::EcmaArray => self.deserialize_map(visitor),
            Amf0Marker::StrictArray => self.deserialize_seq(visitor),
            _ => Err(Amf0Error::UnsupportedMarker(marker)),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        self.expect_marker(&[Amf0Marker::Boolean])?;
        let value = self.reader.read_u8()?;
        visitor.visit_bool(value != 0)
    }

    fn deserialize_i8<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        self.deserialize_i64(visitor)
    }

    fn deserialize_i16<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        self.deserialize_i64(visitor)
    }

    fn deserialize_i32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        self.deserialize_i64(visitor)
    }

    fn deserialize_i64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        let value = self.read_number()?;
        visitor.visit_i64(value as i64)
    }

    fn deserialize_u8<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        self.deserialize_u64(visitor)
    }

    fn deserialize_u16<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        self.deserialize_u64(visitor)
    }

    fn deserialize_u32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        self.deserialize_u64(visitor)
    }

    fn deserialize_u64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        let value = self.read_number()?;
        visitor.visit_u64(value as u64)
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        self.deserialize_f64(visitor)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        let value = self.read_number()?;
        visitor.visit_f64(value)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        let value = self.read_number()?;
        visitor.visit_char(value as u8 as char)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        let s = self.read_string()?;
        s.into_deserializer().deserialize_string(visitor)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        let s = self.read_string()?;
        s.into_deserializer().deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        let marker = self.reader.read_u8()?;
        let marker = Amf0Marker::from_u8(marker).ok_or(Amf0Error::UnknownMarker(marker))?;

        if marker == Amf0Marker::Null || marker == Amf0Marker::Undefined {
            visitor.visit_none()
        } else {
            // We have to seek back because the marker is part of the next value
            self.reader.seek_relative(-1)?;
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        let marker = self.reader.read_u8()?;
        let marker = Amf0Marker::from_u8(marker).ok_or(Amf0Error::UnknownMarker(marker))?;

        if marker == Amf0Marker::Null || marker == Amf0Marker::Undefined {
            visitor.visit_unit()
        } else {
            Err(Amf0Error::UnexpectedType {
                expected: &[Amf0Marker::Null, Amf0Marker::Undefined],
                got: marker,
            })
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        self.expect_marker(&[Amf0Marker::StrictArray])?;
        let size = self.reader.read_u32::<BigEndian>()? as usize;
        visitor.visit_seq(StrictArray {
            de: self,
            remaining: size,
        })
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        self.expect_marker(&[Amf0Marker::StrictArray])?;
        let size = self.reader.read_u32::<BigEndian>()? as usize;

        if len != size {
            return Err(Amf0Error::WrongArrayLength {
                expected: len,
                got: size,
            });
        }

        visitor.visit_seq(StrictArray {
            de: self,
            remaining: size,
        })
    }

    fn deserialize_tuple_struct<V>(self, _name: &'static str, len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        let marker = self.reader.read_u8()?;
        let marker = Amf0Marker::from_u8(marker).ok_or(Amf0Error::UnknownMarker(marker))?;

        if marker == Amf0Marker::TypedObject {
            // Skip the class name
            self.read_normal_string()?;
        }

        if marker == Amf0Marker::Object || marker == Amf0Marker::TypedObject {
            visitor.visit_map(Object { de: self })
        } else if marker == Amf0Marker::EcmaArray {
            let size = self.reader.read_u32::<BigEndian>()? as usize;

            visitor.visit_map(EcmaArray {
                de: self,
                remaining: size,
            })
        } else {
            Err(Amf0Error::UnexpectedType {
                expected: &[Amf0Marker::Object, Amf0Marker::TypedObject, Amf0Marker::EcmaArray],
                got: marker,
            })
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        visitor.visit_enum(Enum { de: self })
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        let s = self.read_string()?;
        s.into_deserializer().deserialize_identifier(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        self.deserialize_any(visitor)
    }
}

struct StrictArray<'a> {
    de: &'a mut Deserializer,
    remaining: usize,
}

impl<'a, 'de> SeqAccess<'de> for StrictArray<'a> {
    type Error = Amf0Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: serde::de::DeserializeSeed<'de>,
    {
        if self.remaining == 0 {
            return Ok(None);
        }

        self.remaining -= 1;
        seed.deserialize(&mut *self.de).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

struct Object<'a> {
    de: &'a mut Deserializer,
}

impl<'a, 'de> MapAccess<'de> for Object<'a> {
    type Error = Amf0Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: serde::de::DeserializeSeed<'de>,
    {
        let end_marker = self.de.reader.read_u24::<BigEndian>()?;
        if end_marker == Amf0Marker::ObjectEnd as u32 {
            return Ok(None);
        }

        // Seek back to the start of the key
        self.de.reader.seek_relative(-3)?;

        // Object keys are not preceeded with a marker and are always normal strings
        let s = self.de.read_normal_string()?;
        let string_de = IntoDeserializer::<Self::Error>::into_deserializer(s);
        seed.deserialize(string_de).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::DeserializeSeed<'de>,
    {
        seed.deserialize(&mut *self.de)
    }
}

struct EcmaArray<'a> {
    de: &'a mut Deserializer,
    remaining: usize,
}

impl<'a, 'de> MapAccess<'de> for EcmaArray<'a> {
    type Error = Amf0Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: serde::de::DeserializeSeed<'de>,
    {
        if self.remaining == 0 {
            // It seems like the object end marker is optional here?
            // Anyway, we don't need it because we know the length of the array

            let maybe_end_marker = self.de.reader.read_u24::<BigEndian>()?;
            if maybe_end_marker != Amf0Marker::ObjectEnd as u32 {
                // Seek back if this wasn't an end marker
                self.de.reader.seek_relative(-3)?;
            }

            return Ok(None);
        }

        self.remaining -= 1;

        // Object keys are not preceeded with a marker and are always normal strings
        let s = self.de.read_normal_string()?;
        let string_de = IntoDeserializer::<Self::Error>::into_deserializer(s);
        seed.deserialize(string_de).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::DeserializeSeed<'de>,
    {
        seed.deserialize(&mut *self.de)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

struct Enum<'a> {
    de: &'a mut Deserializer,
}

impl<'a, 'de> EnumAccess<'de> for Enum<'a> {
    type Error = Amf0Error;
    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: serde::de::DeserializeSeed<'de>,
    {
        let variant = self.de.read_string()?;
        let string_de = IntoDeserializer::<Self::Error>::into_deserializer(variant);
        let value = seed.deserialize(string_de)?;

        Ok((value, self))
    }
}

impl<'a, 'de> VariantAccess<'de> for Enum<'a> {
    type Error = Amf0Error;

    fn unit_variant(self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Self::Error>
    where
        T: serde::de::DeserializeSeed<'de>,
    {
        seed.deserialize(&mut *self.de)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        serde::de::Deserializer::deserialize_seq(self.de, visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        serde::de::Deserializer::deserialize_map(self.de, visitor)
    }
}
