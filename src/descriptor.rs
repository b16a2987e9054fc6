//! Schema descriptors
//!
//! Record schemas declared as typed attributes instead of hand-written Avro
//! JSON. A descriptor renders its schema text and parses it on first use and
//! keeps both for its lifetime:
//!
//! ```text
//! SchemaDescriptor::new("child", [
//!     Attribute::new("name", Primitive::String),
//!     Attribute::new("age", Primitive::Long),
//! ])
//!
//! {"name":"child","type":"record","fields":[{"name":"name","type":"string"},{"name":"age","type":"long"}]}
//! ```
//!
//! Attribute order is field order, which the binary encoding depends on.

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};

use apache_avro::types::Value;
use apache_avro::Schema;

use crate::codec;
use crate::error::Result;
use crate::fingerprint::SchemaFingerprint;

/// Avro primitive types usable as attribute types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
}

impl Primitive {
    /// The Avro type name
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Bytes => "bytes",
            Primitive::String => "string",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a type's rendered text is embedded in the enclosing schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendering {
    /// Renders to a JSON object, spliced in as is
    Object,
    /// Renders to a bare type name, spliced in as a JSON string
    Name,
}

/// The type of an attribute
#[derive(Debug, Clone)]
pub enum TypeRepresentation {
    Primitive(Primitive),
    ArrayOf(Box<TypeRepresentation>),
    Record(Arc<SchemaDescriptor>),
}

impl TypeRepresentation {
    /// An array whose items have type `item`
    pub fn array_of(item: impl Into<TypeRepresentation>) -> Self {
        TypeRepresentation::ArrayOf(Box::new(item.into()))
    }

    /// A nested record
    pub fn record(descriptor: impl Into<Arc<SchemaDescriptor>>) -> Self {
        TypeRepresentation::Record(descriptor.into())
    }

    pub fn rendering(&self) -> Rendering {
        match self {
            TypeRepresentation::Primitive(_) => Rendering::Name,
            TypeRepresentation::ArrayOf(_) | TypeRepresentation::Record(_) => Rendering::Object,
        }
    }

    /// Rendered text before embedding: a type name or a JSON object
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            TypeRepresentation::Primitive(primitive) => Cow::Borrowed(primitive.name()),
            TypeRepresentation::ArrayOf(items) => {
                let mut out = String::from(r#"{"type":"array","items":"#);
                items.write_json(&mut out);
                out.push('}');
                Cow::Owned(out)
            }
            TypeRepresentation::Record(descriptor) => Cow::Borrowed(descriptor.json_representation()),
        }
    }

    /// Rendered text as a JSON value
    pub fn to_json(&self) -> String {
        let mut out = String::new();
        self.write_json(&mut out);
        out
    }

    fn write_json(&self, out: &mut String) {
        let rendered = self.render();
        match self.rendering() {
            Rendering::Object => out.push_str(&rendered),
            Rendering::Name => push_quoted(out, &rendered),
        }
    }
}

impl From<Primitive> for TypeRepresentation {
    fn from(primitive: Primitive) -> Self {
        TypeRepresentation::Primitive(primitive)
    }
}

impl From<SchemaDescriptor> for TypeRepresentation {
    fn from(descriptor: SchemaDescriptor) -> Self {
        TypeRepresentation::Record(Arc::new(descriptor))
    }
}

impl From<Arc<SchemaDescriptor>> for TypeRepresentation {
    fn from(descriptor: Arc<SchemaDescriptor>) -> Self {
        TypeRepresentation::Record(descriptor)
    }
}

/// A named, typed record field
#[derive(Debug, Clone)]
pub struct Attribute {
    name: String,
    ty: TypeRepresentation,
}

impl Attribute {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRepresentation>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }

    /// Field name, as used for the keys of a record value
    pub fn field_name(&self) -> &str {
        &self.name
    }

    pub fn type_representation(&self) -> &TypeRepresentation {
        &self.ty
    }

    fn write_json(&self, out: &mut String) {
        out.push_str(r#"{"name":"#);
        push_quoted(out, &self.name);
        out.push_str(r#","type":"#);
        self.ty.write_json(out);
        out.push('}');
    }
}

/// A record schema built from attributes.
///
/// Rendering and parsing happen at most once per descriptor, also when the
/// descriptor is shared between threads.
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    name: String,
    attributes: Vec<Attribute>,
    json: OnceLock<String>,
    schema: OnceLock<Schema>,
}

impl SchemaDescriptor {
    pub fn new(name: impl Into<String>, attributes: impl IntoIterator<Item = Attribute>) -> Self {
        Self {
            name: name.into(),
            attributes: attributes.into_iter().collect(),
            json: OnceLock::new(),
            schema: OnceLock::new(),
        }
    }

    /// Append an attribute
    pub fn attribute(mut self, name: impl Into<String>, ty: impl Into<TypeRepresentation>) -> Self {
        self.attributes.push(Attribute::new(name, ty));
        self.json = OnceLock::new();
        self.schema = OnceLock::new();
        self
    }

    /// Record name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// The Avro schema text of this record
    pub fn json_representation(&self) -> &str {
        self.json.get_or_init(|| self.render())
    }

    /// The parsed schema.
    ///
    /// # Panics
    ///
    /// Panics if the rendered text is rejected by the Avro parser, e.g. for a
    /// record or field name that is not a valid Avro name, or a nested record
    /// defined twice in the same schema. Both are defects in how the
    /// descriptor was declared.
    pub fn schema(&self) -> &Schema {
        self.schema.get_or_init(|| match codec::parse_schema(self.json_representation()) {
            Ok(schema) => schema,
            Err(e) => {
                tracing::error!(record = %self.name, error = %e, "descriptor rendered an invalid schema");
                panic!("schema descriptor `{}` rendered an invalid schema: {}", self.name, e);
            }
        })
    }

    pub fn fingerprint(&self) -> SchemaFingerprint {
        SchemaFingerprint::of(self.schema())
    }

    /// Encode a record value against this descriptor's schema
    pub fn encode(&self, value: impl Into<Value>) -> Result<Vec<u8>> {
        Ok(codec::encode(self.schema(), value)?)
    }

    /// Decode one record from `bytes`; `None` if they do not match the schema
    pub fn decode(&self, bytes: &[u8]) -> Option<Value> {
        codec::decode(self.schema(), bytes)
    }

    fn render(&self) -> String {
        let mut out = String::from(r#"{"name":"#);
        push_quoted(&mut out, &self.name);
        out.push_str(r#","type":"record","fields":["#);
        for (i, attribute) in self.attributes.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            attribute.write_json(&mut out);
        }
        out.push_str("]}");
        out
    }
}

fn push_quoted(out: &mut String, s: &str) {
    out.push_str(&serde_json::Value::from(s).to_string());
}
