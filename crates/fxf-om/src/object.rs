//! Object model node kinds

use fxf_markup::XmlId;
use fxf_registry::{ObjId, TypeId};
use indexmap::IndexMap;

use crate::property::PropertyName;
use crate::{FxomId, PropId};

/// Where an object is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FxomParent {
    /// Value of an object-valued property
    Property(PropId),
    /// Item of a collection
    Collection(FxomId),
}

/// A node of the object model. Wraps exactly one markup element and, when
/// resolvable, exactly one runtime object.
#[derive(Debug, Clone)]
pub struct FxomNode {
    pub(crate) element: XmlId,
    pub(crate) runtime: Option<ObjId>,
    pub(crate) parent: Option<FxomParent>,
    pub(crate) data: FxomData,
}

impl FxomNode {
    pub fn element(&self) -> XmlId {
        self.element
    }

    pub fn runtime(&self) -> Option<ObjId> {
        self.runtime
    }

    pub fn parent(&self) -> Option<FxomParent> {
        self.parent
    }

    pub fn data(&self) -> &FxomData {
        &self.data
    }

    pub fn as_instance(&self) -> Option<&InstanceData> {
        match &self.data {
            FxomData::Instance(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&CollectionData> {
        match &self.data {
            FxomData::Collection(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_intrinsic(&self) -> Option<&IntrinsicData> {
        match &self.data {
            FxomData::Intrinsic(i) => Some(i),
            _ => None,
        }
    }
}

/// Closed set of node kinds
#[derive(Debug, Clone)]
pub enum FxomData {
    /// Constructed typed instance
    Instance(InstanceData),
    /// Ordered sequence value
    Collection(CollectionData),
    /// Non-constructive directive: include, reference, or copy
    Intrinsic(IntrinsicData),
}

/// Instance-specific data
#[derive(Debug, Clone)]
pub struct InstanceData {
    /// Type name as written at the element tag (simple or qualified)
    pub declared_name: String,
    /// Resolved declared class
    pub type_id: Option<TypeId>,
    /// Properties in declaration order
    pub properties: IndexMap<PropertyName, PropId>,
}

/// Collection-specific data
#[derive(Debug, Clone)]
pub struct CollectionData {
    pub declared_name: String,
    pub type_id: Option<TypeId>,
    pub items: Vec<FxomId>,
}

/// Intrinsic directive kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntrinsicKind {
    Include,
    Reference,
    Copy,
}

impl IntrinsicKind {
    /// Tag the directive is written as
    pub fn tag(self) -> &'static str {
        match self {
            IntrinsicKind::Include => "fx:include",
            IntrinsicKind::Reference => "fx:reference",
            IntrinsicKind::Copy => "fx:copy",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "fx:include" => Some(IntrinsicKind::Include),
            "fx:reference" => Some(IntrinsicKind::Reference),
            "fx:copy" => Some(IntrinsicKind::Copy),
            _ => None,
        }
    }
}

/// Intrinsic-specific data. The `source` and `charset` attributes are
/// hoisted into the property map; an intrinsic has no child objects.
#[derive(Debug, Clone)]
pub struct IntrinsicData {
    pub kind: IntrinsicKind,
    pub properties: IndexMap<PropertyName, PropId>,
}
