use std::any::Any;

use arrow::array::{Array, LargeStringArray, PrimitiveArray, StringArray};
use arrow::array::timezone::Tz;
use arrow::datatypes::{
    ArrowTemporalType, DataType, Date64Type, Time32MillisecondType, Time32SecondType,
    Time64MicrosecondType, Time64NanosecondType, TimeUnit, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType,
};
use callstat_schema::CallRecords;
use callstat_types::{CallRecord, TimeValue};

use crate::ReportError;

/// Text column view over either offset width; an all-null column reads as `None`.
enum StrColumn<'a> {
    Utf8(&'a StringArray),
    LargeUtf8(&'a LargeStringArray),
    Null,
}

impl<'a> StrColumn<'a> {
    fn new(array: &'a dyn Array, name: &str) -> Result<Self, ReportError> {
        let invalid = || ReportError::InvalidColumnType(name.to_string());
        match array.data_type() {
            DataType::Utf8 => array
                .as_any()
                .downcast_ref::<StringArray>()
                .map(StrColumn::Utf8)
                .ok_or_else(invalid),
            DataType::LargeUtf8 => array
                .as_any()
                .downcast_ref::<LargeStringArray>()
                .map(StrColumn::LargeUtf8)
                .ok_or_else(invalid),
            DataType::Null => Ok(StrColumn::Null),
            _ => Err(invalid()),
        }
    }

    fn get(&self, row: usize) -> Option<&'a str> {
        match *self {
            StrColumn::Utf8(a) => (!a.is_null(row)).then(|| a.value(row)),
            StrColumn::LargeUtf8(a) => (!a.is_null(row)).then(|| a.value(row)),
            StrColumn::Null => None,
        }
    }
}

fn native_time<T>(any: &dyn Any, row: usize) -> Option<TimeValue<'static>>
where
    T: ArrowTemporalType,
    i64: From<T::Native>,
{
    any.downcast_ref::<PrimitiveArray<T>>()?
        .value_as_time(row)
        .map(TimeValue::Time)
}

/// Zoned timestamps are read as wall-clock time in their own zone; an
/// unparseable zone falls back to UTC.
fn native_datetime<T>(any: &dyn Any, row: usize, tz: Option<&str>) -> Option<TimeValue<'static>>
where
    T: ArrowTemporalType,
    i64: From<T::Native>,
{
    let array = any.downcast_ref::<PrimitiveArray<T>>()?;
    let zoned = tz
        .and_then(|tz| tz.parse::<Tz>().ok())
        .and_then(|tz| array.value_as_datetime_with_tz(row, tz))
        .map(|dt| dt.naive_local());
    zoned
        .or_else(|| array.value_as_datetime(row))
        .map(TimeValue::DateTime)
}

/// Read one cell of the time column as a [`TimeValue`].
pub fn time_value(array: &dyn Array, row: usize) -> TimeValue<'_> {
    if array.is_null(row) {
        return TimeValue::Missing;
    }
    let any = array.as_any();
    let value = match array.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| TimeValue::Text(a.value(row))),
        DataType::LargeUtf8 => any
            .downcast_ref::<LargeStringArray>()
            .map(|a| TimeValue::Text(a.value(row))),
        DataType::Time32(TimeUnit::Second) => native_time::<Time32SecondType>(any, row),
        DataType::Time32(TimeUnit::Millisecond) => native_time::<Time32MillisecondType>(any, row),
        DataType::Time64(TimeUnit::Microsecond) => native_time::<Time64MicrosecondType>(any, row),
        DataType::Time64(TimeUnit::Nanosecond) => native_time::<Time64NanosecondType>(any, row),
        DataType::Timestamp(unit, tz) => {
            let tz = tz.as_deref();
            match unit {
                TimeUnit::Second => native_datetime::<TimestampSecondType>(any, row, tz),
                TimeUnit::Millisecond => native_datetime::<TimestampMillisecondType>(any, row, tz),
                TimeUnit::Microsecond => native_datetime::<TimestampMicrosecondType>(any, row, tz),
                TimeUnit::Nanosecond => native_datetime::<TimestampNanosecondType>(any, row, tz),
            }
        }
        DataType::Date64 => native_datetime::<Date64Type>(any, row, None),
        _ => None,
    };
    value.unwrap_or(TimeValue::Unsupported)
}

/// Convert the checked table into zero-copy [`CallRecord`] rows.
///
/// Result and Employee must be text (or all-null) columns; the time column
/// may be of any type and is interpreted per cell.
pub fn call_records(table: &CallRecords) -> Result<Vec<CallRecord<'_>>, ReportError> {
    let time: &dyn Array = table.time().as_ref();
    let result: &dyn Array = table.result().as_ref();
    let employee: &dyn Array = table.employee().as_ref();
    let outcomes = StrColumn::new(result, "Result")?;
    let actors = StrColumn::new(employee, "Employee")?;

    Ok((0..table.num_rows())
        .map(|row| CallRecord {
            actor: actors.get(row),
            time: time_value(time, row),
            outcome: outcomes.get(row),
        })
        .collect())
}
