use crate::value::ValueKind;

/// A single named field of a [`Record`](crate::record::Record) type.
///
/// Emitted by `#[derive(Record)]` as a `'static` table in declaration order.
/// The table is built at compile time, so discovery never allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Map key of the field. Defaults to the Rust field name,
    /// overridden by `#[field(rename = "...")]`.
    pub name: &'static str,
    /// Declared kind of the field type.
    pub kind: ValueKind,
    /// `Option<_>` fields accept `Value::Null` directly.
    pub nullable: bool,
    /// Appears in `object_to_map` output.
    pub readable: bool,
    /// Assigned by `map_to_object`.
    pub writable: bool,
}

impl FieldDescriptor {
    /// Descriptor for a field that can be read and written.
    pub const fn new(name: &'static str, kind: ValueKind, nullable: bool) -> Self {
        Self {
            name,
            kind,
            nullable,
            readable: true,
            writable: true,
        }
    }

    pub const fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    pub const fn write_only(mut self) -> Self {
        self.readable = false;
        self
    }
}

/// Ordered field table of a record type.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub type_name: &'static str,
    pub fields: &'static [FieldDescriptor],
}

impl Schema {
    pub fn readable(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        self.fields.iter().filter(|f| f.readable)
    }

    pub fn writable(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        self.fields.iter().filter(|f| f.writable)
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    static FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("id", ValueKind::I64, false).read_only(),
        FieldDescriptor::new("name", ValueKind::Str, false),
        FieldDescriptor::new("secret", ValueKind::Str, true).write_only(),
    ];

    #[rstest]
    fn test_readable_and_writable_filters() {
        // Arrange
        let schema = Schema { type_name: "User", fields: FIELDS };

        // Act
        let readable: Vec<_> = schema.readable().map(|f| f.name).collect();
        let writable: Vec<_> = schema.writable().map(|f| f.name).collect();

        // Assert
        assert_eq!(readable, vec!["id", "name"]);
        assert_eq!(writable, vec!["name", "secret"]);
        assert_eq!(schema.field("secret").map(|f| f.nullable), Some(true));
        assert!(schema.field("missing").is_none());
    }
}
