/// Declares the copyable fields of a document type.
///
/// Generates a field enum with an `ALL` list and the YAML key of each field, plus
/// `copy_fields` and one partial setter per field on the owning type. Partial setters
/// assign only when handed `Some`, so repeated construction never clobbers an earlier
/// value with absence. Field lists are checked by the compiler, so copying a field the
/// source does not have cannot happen.
macro_rules! document_fields {
    (
        $(#[$enum_meta:meta])*
        $owner:ident => $enum_name:ident {
            $(
                $variant:ident => $field:ident : $key:literal, $setter:ident($arg:ty)
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $enum_name {
            $($variant,)*
        }

        impl $enum_name {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            /// Key of this field in the serialized document
            pub fn key(&self) -> &'static str {
                match self {
                    $(Self::$variant => $key,)*
                }
            }
        }

        impl $owner {
            /// Copies `fields` from `source`; a missing source leaves `self` untouched
            pub fn copy_fields(&mut self, source: Option<&$owner>, fields: &[$enum_name]) {
                let Some(source) = source else {
                    return;
                };

                for field in fields {
                    match field {
                        $($enum_name::$variant => self.$field = source.$field.clone(),)*
                    }
                }
            }

            $(
                pub fn $setter(&mut self, value: Option<$arg>) -> &mut Self {
                    if let Some(value) = value {
                        self.$field = value.into();
                    }
                    self
                }
            )*
        }
    };
}
