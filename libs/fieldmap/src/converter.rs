use crate::coerce::coerce;
use crate::config::ConvertOptions;
use crate::error::{Error, Result};
use crate::map::FieldMap;
use crate::record::Record;
use crate::schema::FieldDescriptor;
use crate::value::{Value, ValueKind};

/// Two-way bridge between records and [`FieldMap`]s.
///
/// Loose on names, strict on types:
/// - Keys without a writable field are ignored; fields without a key keep their value.
/// - A value that cannot be coerced into its field's kind aborts the call.
///   Fields applied before the failure stay applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Readable fields of `model`, in declaration order, values as-is.
    pub fn object_to_map<T: Record>(&self, model: &T) -> Result<FieldMap> {
        let schema = T::schema();
        if !model.is_valid() {
            return Err(Error::invalid_argument(format!("{} not valid", schema.type_name)));
        }

        let mut map = FieldMap::with_capacity(schema.fields.len());
        for field in schema.readable() {
            if let Some(value) = model.get(field.name) {
                map.insert(field.name, value);
            }
        }
        tracing::trace!(record = schema.type_name, fields = map.len(), "record read into map");
        Ok(map)
    }

    /// Assign matching entries of `map` to the writable fields of `model`.
    pub fn map_to_object<'a, T: Record>(&self, map: &FieldMap, model: &'a mut T) -> Result<&'a mut T> {
        let schema = T::schema();
        if !model.is_valid() {
            return Err(Error::invalid_argument(format!("{} not valid", schema.type_name)));
        }
        if !map.is_valid() {
            return Err(Error::invalid_argument("field map not valid"));
        }

        let mut applied = 0usize;
        for field in schema.writable() {
            let Some(value) = map.get(field.name) else {
                continue;
            };
            let ctx = || format!("field '{}'", field.name);
            let value = self.adapt(field, value.clone()).map_err(|e| e.with_context(ctx()))?;
            model.set(field.name, value).map_err(|e| e.with_context(ctx()))?;
            applied += 1;
        }
        tracing::trace!(
            record = schema.type_name,
            applied,
            ignored = map.len().saturating_sub(applied),
            "map applied to record"
        );
        Ok(model)
    }

    /// Bring `value` to the declared kind of `field`.
    ///
    /// Same kind, `Null` into a nullable field and anything into a list field
    /// pass through untouched; everything else goes through coercion.
    fn adapt(&self, field: &FieldDescriptor, value: Value) -> Result<Value> {
        if value.kind() == field.kind
            || (field.nullable && value.is_null())
            || field.kind == ValueKind::List
        {
            return Ok(value);
        }
        tracing::debug!(field = field.name, from = %value.kind(), to = %field.kind, "coercing value");
        coerce(value, field.kind, self.options.enum_ignore_case)
    }
}

/// [`Converter::object_to_map`] with default options.
pub fn object_to_map<T: Record>(model: &T) -> Result<FieldMap> {
    Converter::default().object_to_map(model)
}

/// [`Converter::map_to_object`] with default options.
pub fn map_to_object<'a, T: Record>(map: &FieldMap, model: &'a mut T) -> Result<&'a mut T> {
    Converter::default().map_to_object(map, model)
}
