//! Macro that turns a table declaration into an Arrow schema and a checked batch wrapper.

/// Map DSL token -> Arrow DataType.
#[macro_export]
macro_rules! __ty_to_arrow {
    ( Utf8 ) => { ::arrow::datatypes::DataType::Utf8 };
}

/// Declarative table definitions. Generates the canonical schema and a wrapper
/// that resolves every declared column by name once, up front.
///
/// Column types in the DSL describe the canonical (all-text) export. The
/// wrapper itself only checks presence, so callers may hand in native Arrow
/// types for the same columns.
#[macro_export]
macro_rules! define_tables {
    (
        $(
            $(#[$meta:meta])*
            table $Name:ident {
                columns: {
                    $( $fname:ident : $fty:ident => $col:literal ),* $(,)?
                }
            }
        ),* $(,)?
    ) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Debug)]
            pub struct $Name {
                inner: ::std::sync::Arc<::arrow::record_batch::RecordBatch>,
                $( $fname: usize, )*
            }

            impl $Name {
                /// Required column names, in declaration order.
                pub const COLUMNS: &'static [&'static str] = &[ $( $col ),* ];

                /// Canonical Arrow schema for this table.
                pub fn schema() -> ::arrow::datatypes::Schema {
                    ::arrow::datatypes::Schema::new(vec![
                        $(
                            ::arrow::datatypes::Field::new(
                                $col,
                                $crate::__ty_to_arrow!($fty),
                                true,
                            ),
                        )*
                    ])
                }

                /// Wrap a batch, failing with every absent column at once.
                pub fn new(
                    inner: ::std::sync::Arc<::arrow::record_batch::RecordBatch>,
                ) -> ::std::result::Result<Self, $crate::SchemaError> {
                    let schema = inner.schema();
                    let missing: Vec<String> = Self::COLUMNS
                        .iter()
                        .filter(|col| schema.index_of(col).is_err())
                        .map(|col| col.to_string())
                        .collect();
                    if !missing.is_empty() {
                        return Err($crate::SchemaError::MissingColumns(missing));
                    }
                    $( let $fname = schema.index_of($col)?; )*
                    Ok(Self { inner, $( $fname, )* })
                }

                /// Underlying Arrow batch.
                pub fn inner(&self) -> &::std::sync::Arc<::arrow::record_batch::RecordBatch> {
                    &self.inner
                }

                pub fn num_rows(&self) -> usize {
                    self.inner.num_rows()
                }

                $(
                    #[doc = concat!("The `", $col, "` column.")]
                    pub fn $fname(&self) -> &::arrow::array::ArrayRef {
                        self.inner.column(self.$fname)
                    }
                )*
            }
        )*
    };
}
