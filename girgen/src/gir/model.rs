use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GirError;

/// A parsed introspection document.
///
/// `path` is the file the repository was loaded from; it is not part of the
/// serialized document and is filled in by [`Repositories::load`](crate::Repositories::load).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Repository {
    #[serde(skip)]
    pub path: String,
    pub namespace: Namespace,
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default)]
    pub c_includes: Vec<CInclude>,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Namespace {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub shared_library: Option<String>,
    #[serde(default)]
    pub c_prefix: Option<String>,
}

impl Namespace {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }
}

/// A pkg-config package the native library is linked through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Package {
    pub name: String,
}

/// A native header the generated code includes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CInclude {
    pub name: String,
}

/// Documentation and declaration-position metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct InfoElements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Doc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_position: Option<SourcePosition>,
}

impl InfoElements {
    /// The file the element was declared or documented in, declaration first.
    pub fn file(&self) -> Option<&str> {
        let position = self
            .source_position
            .as_ref()
            .map(|p| p.filename.as_str())
            .filter(|f| !f.is_empty());
        position.or_else(|| {
            self.doc
                .as_ref()
                .map(|d| d.filename.as_str())
                .filter(|f| !f.is_empty())
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Doc {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub string: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SourcePosition {
    pub filename: String,
    #[serde(default)]
    pub line: u32,
}

/// Parameter direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    In,
    Out,
    #[serde(rename = "inout")]
    InOut,
}

impl FromStr for Direction {
    type Err = GirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            "inout" => Ok(Direction::InOut),
            other => Err(GirError::InvalidDirection(other.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
            Direction::InOut => write!(f, "inout"),
        }
    }
}

/// Who releases the native memory behind a value once the call returns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Transfer {
    #[default]
    None,
    Container,
    Full,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub transfer_ownership: Transfer,
    /// GIR type name, e.g. `ParseLocation` or `GLib.Error`.
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub c_type: Option<String>,
    #[serde(default)]
    pub nullable: bool,
    /// Index of the user-data parameter this callback parameter is paired with.
    #[serde(default)]
    pub closure: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ReturnValue {
    #[serde(default)]
    pub transfer_ownership: Transfer,
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub c_type: Option<String>,
}

impl ReturnValue {
    pub fn is_void(&self) -> bool {
        matches!(self.type_name.as_deref(), None | Some("none"))
    }
}

/// Attributes shared by functions, callbacks, constructors and methods.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CallableAttrs {
    pub name: String,
    #[serde(default)]
    pub c_identifier: Option<String>,
    #[serde(default)]
    pub introspectable: Option<bool>,
    #[serde(default)]
    pub throws: bool,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub return_value: Option<ReturnValue>,
    #[serde(flatten)]
    pub info: InfoElements,
}

impl CallableAttrs {
    pub fn find_parameter_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.name == name)
    }
}

pub type Method = CallableAttrs;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Signal {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub return_value: Option<ReturnValue>,
    #[serde(flatten)]
    pub info: InfoElements,
}

impl Signal {
    pub fn find_parameter_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Field {
    pub name: String,
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    #[serde(flatten)]
    pub info: InfoElements,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Member {
    pub name: String,
    #[serde(default)]
    pub value: i64,
    pub c_identifier: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Class {
    pub name: String,
    #[serde(default)]
    pub c_type: Option<String>,
    #[serde(default)]
    pub constructors: Vec<Method>,
    #[serde(default)]
    pub methods: Vec<Method>,
    #[serde(default)]
    pub virtual_methods: Vec<Method>,
    #[serde(default)]
    pub signals: Vec<Signal>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(flatten)]
    pub info: InfoElements,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Record {
    pub name: String,
    #[serde(default)]
    pub c_type: Option<String>,
    #[serde(default)]
    pub constructors: Vec<Method>,
    #[serde(default)]
    pub methods: Vec<Method>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(flatten)]
    pub info: InfoElements,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Interface {
    pub name: String,
    #[serde(default)]
    pub c_type: Option<String>,
    #[serde(default)]
    pub methods: Vec<Method>,
    #[serde(default)]
    pub virtual_methods: Vec<Method>,
    #[serde(default)]
    pub signals: Vec<Signal>,
    #[serde(flatten)]
    pub info: InfoElements,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Enum {
    pub name: String,
    #[serde(default)]
    pub c_type: Option<String>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(flatten)]
    pub info: InfoElements,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Callback {
    #[serde(default)]
    pub c_type: Option<String>,
    #[serde(flatten)]
    pub callable: CallableAttrs,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Function {
    #[serde(flatten)]
    pub callable: CallableAttrs,
}

/// A top-level declaration of a namespace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Class(Class),
    Record(Record),
    Interface(Interface),
    Enum(Enum),
    Callback(Callback),
    Function(Function),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Class,
    Record,
    Interface,
    Enum,
    Callback,
    Function,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Class => write!(f, "class"),
            NodeKind::Record => write!(f, "record"),
            NodeKind::Interface => write!(f, "interface"),
            NodeKind::Enum => write!(f, "enum"),
            NodeKind::Callback => write!(f, "callback"),
            NodeKind::Function => write!(f, "function"),
        }
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Class(_) => NodeKind::Class,
            Node::Record(_) => NodeKind::Record,
            Node::Interface(_) => NodeKind::Interface,
            Node::Enum(_) => NodeKind::Enum,
            Node::Callback(_) => NodeKind::Callback,
            Node::Function(_) => NodeKind::Function,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Class(v) => &v.name,
            Node::Record(v) => &v.name,
            Node::Interface(v) => &v.name,
            Node::Enum(v) => &v.name,
            Node::Callback(v) => &v.callable.name,
            Node::Function(v) => &v.callable.name,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self {
            Node::Class(v) => v.name = name,
            Node::Record(v) => v.name = name,
            Node::Interface(v) => v.name = name,
            Node::Enum(v) => v.name = name,
            Node::Callback(v) => v.callable.name = name,
            Node::Function(v) => v.callable.name = name,
        }
    }

    /// The native identifier of the declaration (`c:type` or `c:identifier`).
    pub fn c_name(&self) -> Option<&str> {
        match self {
            Node::Class(v) => v.c_type.as_deref(),
            Node::Record(v) => v.c_type.as_deref(),
            Node::Interface(v) => v.c_type.as_deref(),
            Node::Enum(v) => v.c_type.as_deref(),
            Node::Callback(v) => v.c_type.as_deref(),
            Node::Function(v) => v.callable.c_identifier.as_deref(),
        }
    }

    pub fn info(&self) -> &InfoElements {
        match self {
            Node::Class(v) => &v.info,
            Node::Record(v) => &v.info,
            Node::Interface(v) => &v.info,
            Node::Enum(v) => &v.info,
            Node::Callback(v) => &v.callable.info,
            Node::Function(v) => &v.callable.info,
        }
    }

    pub fn info_mut(&mut self) -> &mut InfoElements {
        match self {
            Node::Class(v) => &mut v.info,
            Node::Record(v) => &mut v.info,
            Node::Interface(v) => &mut v.info,
            Node::Enum(v) => &mut v.info,
            Node::Callback(v) => &mut v.callable.info,
            Node::Function(v) => &mut v.callable.info,
        }
    }

    /// The node's own callable attributes, for functions and callbacks.
    pub fn callable_mut(&mut self) -> Option<&mut CallableAttrs> {
        match self {
            Node::Callback(v) => Some(&mut v.callable),
            Node::Function(v) => Some(&mut v.callable),
            Node::Class(_) | Node::Record(_) | Node::Interface(_) | Node::Enum(_) => None,
        }
    }

    /// Member callable lists in lookup priority order.
    ///
    /// Classes and records search constructors then methods; interfaces search
    /// methods then virtual methods. `None` for kinds that have no members.
    pub fn member_lists_mut(&mut self) -> Option<Vec<&mut Vec<Method>>> {
        match self {
            Node::Class(v) => Some(vec![&mut v.constructors, &mut v.methods]),
            Node::Record(v) => Some(vec![&mut v.constructors, &mut v.methods]),
            Node::Interface(v) => Some(vec![&mut v.methods, &mut v.virtual_methods]),
            Node::Enum(_) | Node::Callback(_) | Node::Function(_) => None,
        }
    }

    pub fn signals_mut(&mut self) -> Option<&mut Vec<Signal>> {
        match self {
            Node::Class(v) => Some(&mut v.signals),
            Node::Interface(v) => Some(&mut v.signals),
            Node::Record(_) | Node::Enum(_) | Node::Callback(_) | Node::Function(_) => None,
        }
    }

    pub fn fields(&self) -> &[Field] {
        match self {
            Node::Class(v) => &v.fields,
            Node::Record(v) => &v.fields,
            Node::Interface(_) | Node::Enum(_) | Node::Callback(_) | Node::Function(_) => &[],
        }
    }
}
