//! Structured, ordered-field records packed/unpacked as a single run of
//! [`BytePrimitive`] values — the Rust analogue of a combined
//! `struct.pack`/`struct.unpack` call over a dataclass's annotated fields
//! (`helpers/byte_data_class.py::StructuredInfo`).
//!
//! [`define_record!`] generates a struct plus a [`Record`] impl whose
//! `pack`/`unpack` walk the fields in declaration order. Most WFM records
//! only ever need declaration order; the handful that don't (fast-frame
//! loops reading N identical records back to back) just call `unpack`
//! in a loop rather than needing a reorderable field list.

use std::io::{Read, Write};

use crate::bytes::{BytePrimitive, Endian};
use crate::error::Result;

/// A fixed-layout group of [`BytePrimitive`] fields, read and written as
/// one contiguous run.
pub trait Record: Sized {
    /// Total size on disk, the sum of every field's length.
    const BYTE_LEN: usize;

    fn pack<W: Write>(&self, endian: Endian, sink: &mut W) -> Result<()>;
    fn unpack<R: Read>(endian: Endian, source: &mut R) -> Result<Self>;

    /// Sum of every field's raw bytes, folded into the running file checksum.
    fn byte_sum(&self, endian: Endian) -> Result<u64>;
}

/// Generates a `pub struct $name { $field: $ty, ... }` plus a [`Record`]
/// impl that packs/unpacks the fields in the order written.
macro_rules! define_record {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name {
            $( pub $field: $ty, )*
        }

        impl Record for $name {
            const BYTE_LEN: usize = 0 $( + <$ty as BytePrimitive>::LEN )*;

            fn pack<W: Write>(&self, endian: Endian, sink: &mut W) -> Result<()> {
                $( self.$field.pack(endian, sink)?; )*
                Ok(())
            }

            fn unpack<R: Read>(endian: Endian, source: &mut R) -> Result<Self> {
                Ok(Self {
                    $( $field: <$ty as BytePrimitive>::unpack(endian, source)?, )*
                })
            }

            fn byte_sum(&self, endian: Endian) -> Result<u64> {
                let mut total = 0u64;
                $( total += self.$field.byte_sum(endian)?; )*
                Ok(total)
            }
        }
    };
}

pub(crate) use define_record;

#[cfg(test)]
mod tests {
    use super::*;

    define_record! {
        Pair {
            a: i32,
            b: u16,
        }
    }

    #[test]
    fn round_trips_in_declaration_order() {
        let value = Pair { a: -7, b: 300 };
        let mut buf = Vec::new();
        value.pack(Endian::Big, &mut buf).unwrap();
        assert_eq!(buf.len(), Pair::BYTE_LEN);
        let mut cursor = std::io::Cursor::new(buf);
        let back = Pair::unpack(Endian::Big, &mut cursor).unwrap();
        assert_eq!(value, back);
    }

    #[test]
    fn byte_sum_is_additive_over_fields() {
        let value = Pair { a: 1, b: 2 };
        let expected = value.a.byte_sum(Endian::Big).unwrap() + value.b.byte_sum(Endian::Big).unwrap();
        assert_eq!(value.byte_sum(Endian::Big).unwrap(), expected);
    }
}
