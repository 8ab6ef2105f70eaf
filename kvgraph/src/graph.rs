//! Walking a key path against a live object graph.
//!
//! Each segment either names a field of the current node or indexes into the
//! list the previous segment resolved to. Missing intermediate values are
//! created on the way down: `None` options are filled with a default
//! instance, and list indices at or past the end append a new element.
//! Terminal values go through the [`BuilderChain`].
//!
//! A path that cannot be resolved is abandoned with a [`PathSkip`]. Changes
//! made by earlier segments of that path are kept.

use core::any::Any;
use core::fmt;

use kvgraph_core::{Def, ListDef, RawValue, Shape};
use tracing::trace;

use crate::{BuilderChain, CancellationToken, Candidate, KeyPath, ListIndex, Segment};

/// Minimum jaro-winkler similarity for a field to be suggested for an
/// unknown property name.
const SIMILARITY_THRESHOLD: f64 = 0.8;

/// Why a path was abandoned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSkip {
    /// The key was blank or consisted of delimiters only.
    EmptyPath,

    /// A name segment matched no field of the current node.
    UnknownProperty {
        /// The node being looked into.
        owner: String,
        /// The segment as written.
        name: String,
        /// The closest field name, if any is close enough.
        suggestion: Option<&'static str>,
    },

    /// An index segment did not directly follow a property, e.g. `0:Name`
    /// or `Matrix:0:1`.
    IndexWithoutProperty {
        /// The index segment.
        index: String,
    },

    /// An index segment followed a property that is not a list.
    NotAList {
        /// Type of the property.
        type_identifier: String,
    },

    /// More segments follow a scalar or enum.
    NotNavigable {
        /// The segment that could not be resolved.
        segment: String,
        /// Type of the value that has no fields.
        type_identifier: String,
    },

    /// An intermediate value was needed but no builder could create it.
    Unconstructible {
        /// Type that could not be created.
        type_identifier: String,
    },

    /// No builder converted the value and the raw value does not fit either.
    Unconverted {
        /// The declared type.
        type_identifier: String,
        /// Kind of the raw value.
        from: &'static str,
    },

    /// A value did not match the shape that describes it.
    ShapeMismatch {
        /// The shape.
        type_identifier: String,
    },

    /// The build was cancelled before this path was processed.
    Cancelled,
}

impl fmt::Display for PathSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSkip::EmptyPath => write!(f, "key has no segments"),
            PathSkip::UnknownProperty {
                owner,
                name,
                suggestion,
            } => {
                write!(f, "{owner} has no property {name:?}")?;
                if let Some(suggestion) = suggestion {
                    write!(f, " (did you mean {suggestion:?}?)")?;
                }
                Ok(())
            }
            PathSkip::IndexWithoutProperty { index } => {
                write!(f, "index {index} does not follow a property")
            }
            PathSkip::NotAList { type_identifier } => {
                write!(f, "{type_identifier} is not a list")
            }
            PathSkip::NotNavigable {
                segment,
                type_identifier,
            } => write!(f, "cannot look up {segment:?} in {type_identifier}"),
            PathSkip::Unconstructible { type_identifier } => {
                write!(f, "cannot create a {type_identifier}")
            }
            PathSkip::Unconverted {
                type_identifier,
                from,
            } => write!(f, "cannot assign a {from} value to {type_identifier}"),
            PathSkip::ShapeMismatch { type_identifier } => {
                write!(f, "value does not match shape {type_identifier}")
            }
            PathSkip::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl core::error::Error for PathSkip {}

/// Applies key paths to one root object.
#[derive(Clone, Copy, Debug)]
pub struct GraphBuilder<'a> {
    chain: &'a BuilderChain,
    cancel: &'a CancellationToken,
}

impl<'a> GraphBuilder<'a> {
    /// A graph builder converting values with `chain`.
    pub fn new(chain: &'a BuilderChain, cancel: &'a CancellationToken) -> Self {
        Self { chain, cancel }
    }

    /// Assigns `raw` at `path` below `root`, whose type is `root_shape`.
    pub fn apply(
        &self,
        root: &mut dyn Any,
        root_shape: Shape,
        path: &KeyPath,
        raw: &RawValue,
    ) -> Result<(), PathSkip> {
        let segments = path.segments();
        let mut node: &mut dyn Any = root;
        let mut node_shape = root_shape;
        // Whether the previous segment resolved to a property.
        let mut after_property = false;

        for (i, segment) in segments.iter().enumerate() {
            let next = segments.get(i + 1);
            trace!(%segment, node = %node_shape, "step");

            match segment {
                Segment::Index(index) => {
                    if !after_property {
                        return Err(PathSkip::IndexWithoutProperty {
                            index: segment.to_string(),
                        });
                    }
                    let Def::List(list) = node_shape.def else {
                        return Err(PathSkip::NotAList {
                            type_identifier: node_shape.to_string(),
                        });
                    };
                    let Some(next) = next else {
                        return self.set_element(node, list, *index, raw);
                    };
                    if let Segment::Index(_) = next {
                        return Err(PathSkip::IndexWithoutProperty {
                            index: next.to_string(),
                        });
                    }
                    let (element, element_shape) = self.element(node, list, *index, next)?;
                    node = element;
                    node_shape = element_shape;
                    after_property = false;
                }
                Segment::Name(name) => {
                    let field = node_shape
                        .field(name)
                        .ok_or_else(|| unknown_property(&node_shape, name))?;
                    let field_shape = field.shape();
                    let slot = (field.get_mut)(node).ok_or_else(|| mismatch(&node_shape))?;
                    let Some(next) = next else {
                        return self.set(slot, field_shape, raw);
                    };
                    navigable(field_shape, next)?;
                    let (child, child_shape) = self.enter(slot, field_shape)?;
                    node = child;
                    node_shape = child_shape;
                    after_property = true;
                }
            }
        }
        Ok(())
    }

    /// Converts `raw` and assigns it to a slot of type `shape`.
    fn set(&self, slot: &mut dyn Any, shape: Shape, raw: &RawValue) -> Result<(), PathSkip> {
        let value = self.value(shape, raw)?;
        (shape.vtable.assign)(slot, value).map_err(|_| unconverted(&shape, raw))
    }

    /// Converts `raw` and stores it at `index`, or appends it when the index
    /// is past the end.
    fn set_element(
        &self,
        list_value: &mut dyn Any,
        list: ListDef,
        index: ListIndex,
        raw: &RawValue,
    ) -> Result<(), PathSkip> {
        let element_shape = list.t();
        let value = self.value(element_shape, raw)?;
        let len = (list.len)(&*list_value);
        let stored = match index {
            ListIndex::At(i) if i < len => {
                let slot = (list.get_mut)(list_value, i).ok_or_else(|| mismatch(&element_shape))?;
                (element_shape.vtable.assign)(slot, value)
            }
            _ => {
                trace!(index = len, element = %element_shape, "appending element");
                (list.push)(list_value, value)
            }
        };
        stored.map_err(|_| unconverted(&element_shape, raw))
    }

    /// The list element at `index`, appending a fresh one when the index is
    /// past the end.
    fn element<'n>(
        &self,
        list_value: &'n mut dyn Any,
        list: ListDef,
        index: ListIndex,
        next: &Segment,
    ) -> Result<(&'n mut dyn Any, Shape), PathSkip> {
        let element_shape = list.t();
        navigable(element_shape, next)?;

        let len = (list.len)(&*list_value);
        let position = match index {
            ListIndex::At(i) if i < len => i,
            _ => {
                let element = self.materialize(element_shape)?;
                (list.push)(&mut *list_value, element).map_err(|_| mismatch(&element_shape))?;
                trace!(index = len, element = %element_shape, "appended element");
                len
            }
        };
        let element =
            (list.get_mut)(list_value, position).ok_or_else(|| mismatch(&element_shape))?;
        self.enter(element, element_shape)
    }

    /// Looks through options and pointers, filling `None` with a fresh value.
    fn enter<'n>(
        &self,
        slot: &'n mut dyn Any,
        shape: Shape,
    ) -> Result<(&'n mut dyn Any, Shape), PathSkip> {
        match shape.def {
            Def::Option(option) => {
                if !(option.is_some)(&*slot) {
                    let inner = option.t();
                    let value = self.materialize(inner)?;
                    let some = (option.wrap_some)(value).map_err(|_| mismatch(&inner))?;
                    (shape.vtable.assign)(&mut *slot, some).map_err(|_| mismatch(&shape))?;
                    trace!(created = %inner, "filled empty option");
                }
                let inner = (option.get_mut)(slot).ok_or_else(|| mismatch(&shape))?;
                self.enter(inner, option.t())
            }
            Def::Pointer(pointer) => {
                let inner = (pointer.get_mut)(slot).ok_or_else(|| mismatch(&shape))?;
                self.enter(inner, pointer.t())
            }
            _ => Ok((slot, shape)),
        }
    }

    /// A terminal value for a slot of type `shape`.
    ///
    /// Pointers are transparent: the pointee is built and then boxed, also
    /// when the pointer sits inside an option.
    fn value(&self, shape: Shape, raw: &RawValue) -> Result<Box<dyn Any>, PathSkip> {
        match shape.def {
            Def::Pointer(pointer) => {
                let inner = self.value(pointer.t(), raw)?;
                return (pointer.wrap)(inner).map_err(|_| unconverted(&shape, raw));
            }
            Def::Option(option) if matches!(option.t().def, Def::Pointer(_)) => {
                if raw.is_blank() {
                    return Ok((option.none)());
                }
                let inner = self.value(option.t(), raw)?;
                return (option.wrap_some)(inner).map_err(|_| unconverted(&shape, raw));
            }
            _ => {}
        }
        match self.chain.run(shape, raw, self.cancel) {
            Candidate::Built(value) => Ok(value),
            Candidate::Raw(unconverted_raw) => {
                trace!(target = %shape, "no builder produced a value, offering the raw value");
                unconverted_raw
                    .into_any()
                    .ok_or_else(|| unconverted(&shape, raw))
            }
        }
    }

    /// A fresh instance of `shape`, produced by running the chain on a null
    /// input.
    fn materialize(&self, shape: Shape) -> Result<Box<dyn Any>, PathSkip> {
        match self.chain.run(shape, &RawValue::Null, self.cancel) {
            Candidate::Built(value) => Ok(value),
            Candidate::Raw(_) => Err(PathSkip::Unconstructible {
                type_identifier: shape.to_string(),
            }),
        }
    }
}

/// Checks that a value of type `shape` can have a `next` segment below it.
///
/// Runs before anything is created, so a path that cannot be resolved at
/// this point does not leave empty intermediates behind.
fn navigable(shape: Shape, next: &Segment) -> Result<(), PathSkip> {
    let mut shape = shape;
    loop {
        match (shape.def, next) {
            (Def::Option(option), _) => shape = option.t(),
            (Def::Pointer(pointer), _) => shape = pointer.t(),
            (Def::Struct(_), Segment::Name(_)) | (Def::List(_), Segment::Index(_)) => {
                return Ok(());
            }
            (_, Segment::Index(_)) => {
                return Err(PathSkip::NotAList {
                    type_identifier: shape.to_string(),
                });
            }
            (_, Segment::Name(_)) => {
                return Err(PathSkip::NotNavigable {
                    segment: next.to_string(),
                    type_identifier: shape.to_string(),
                });
            }
        }
    }
}

fn unknown_property(owner: &Shape, name: &str) -> PathSkip {
    let wanted = name.to_lowercase();
    let mut best: Option<(&'static str, f64)> = None;
    for known in owner.field_names() {
        let similarity = strsim::jaro_winkler(&wanted, &known.replace('_', ""));
        if similarity >= SIMILARITY_THRESHOLD && best.is_none_or(|(_, b)| similarity > b) {
            best = Some((known, similarity));
        }
    }
    PathSkip::UnknownProperty {
        owner: owner.to_string(),
        name: name.to_owned(),
        suggestion: best.map(|(known, _)| known),
    }
}

fn mismatch(shape: &Shape) -> PathSkip {
    PathSkip::ShapeMismatch {
        type_identifier: shape.to_string(),
    }
}

fn unconverted(shape: &Shape, raw: &RawValue) -> PathSkip {
    PathSkip::Unconverted {
        type_identifier: shape.to_string(),
        from: raw.kind(),
    }
}

#[cfg(test)]
mod tests {
    use kvgraph_core::{Model, model};

    use super::*;

    model! {
        #[derive(Debug, Default, PartialEq)]
        struct Line {
            sku: String,
            qty: u32,
        }
    }

    model! {
        #[derive(Debug, Default, PartialEq)]
        struct Order {
            number: i64,
            note: Option<String>,
            lines: Vec<Line>,
            tags: Vec<String>,
            matrix: Vec<Vec<u8>>,
            shipping: Option<Box<Line>>,
            priority: Option<Box<i32>>,
        }
    }

    fn apply(order: &mut Order, key: &str, raw: impl Into<RawValue>) -> Result<(), PathSkip> {
        let chain = BuilderChain::default();
        let cancel = CancellationToken::new();
        let path = KeyPath::parse(key).unwrap();
        GraphBuilder::new(&chain, &cancel).apply(order, Order::shape(), &path, &raw.into())
    }

    #[test]
    fn test_terminal_property() {
        kvgraph_testhelpers::setup();
        let mut order = Order::default();
        apply(&mut order, "Number", "12").unwrap();
        apply(&mut order, "note", "fragile").unwrap();
        assert_eq!(order.number, 12);
        assert_eq!(order.note.as_deref(), Some("fragile"));

        apply(&mut order, "Note", " ").unwrap();
        assert_eq!(order.note, None);
    }

    #[test]
    fn test_list_indices() {
        kvgraph_testhelpers::setup();
        let mut order = Order::default();
        apply(&mut order, "Tags:0", "a").unwrap();
        apply(&mut order, "Tags:7", "b").unwrap();
        apply(&mut order, "Tags:0", "c").unwrap();
        assert_eq!(order.tags, ["c", "b"]);
    }

    #[test]
    fn test_list_of_structs() {
        kvgraph_testhelpers::setup();
        let mut order = Order::default();
        apply(&mut order, "Lines:0:Sku", "A-1").unwrap();
        apply(&mut order, "Lines:0:Qty", 2).unwrap();
        apply(&mut order, "Lines:1:Qty", "5").unwrap();
        assert_eq!(
            order.lines,
            [
                Line {
                    sku: "A-1".to_owned(),
                    qty: 2
                },
                Line {
                    sku: String::new(),
                    qty: 5
                },
            ]
        );
    }

    #[test]
    fn test_option_box_is_created() {
        kvgraph_testhelpers::setup();
        let mut order = Order::default();
        apply(&mut order, "Shipping:Sku", "EXPRESS").unwrap();
        assert_eq!(order.shipping.as_ref().map(|l| l.sku.as_str()), Some("EXPRESS"));
    }

    #[test]
    fn test_terminal_option_box() {
        kvgraph_testhelpers::setup();
        let mut order = Order::default();
        apply(&mut order, "Priority", "5").unwrap();
        assert_eq!(order.priority.as_deref(), Some(&5));
        apply(&mut order, "Priority", 7).unwrap();
        assert_eq!(order.priority.as_deref(), Some(&7));
        apply(&mut order, "Priority", "").unwrap();
        assert_eq!(order.priority, None);

        let err = apply(&mut order, "Priority", "high").unwrap_err();
        assert!(matches!(err, PathSkip::Unconverted { .. }));
        assert_eq!(order.priority, None);
    }

    #[test]
    fn test_unknown_property() {
        kvgraph_testhelpers::setup();
        let mut order = Order::default();
        let skip = apply(&mut order, "Lnes:0:Sku", "x").unwrap_err();
        assert_eq!(
            skip,
            PathSkip::UnknownProperty {
                owner: "Order".to_owned(),
                name: "Lnes".to_owned(),
                suggestion: Some("lines"),
            }
        );
        insta::assert_snapshot!(skip, @r#"Order has no property "Lnes" (did you mean "lines"?)"#);

        let skip = apply(&mut order, "Zebra", "x").unwrap_err();
        insta::assert_snapshot!(skip, @r#"Order has no property "Zebra""#);
        assert_eq!(order, Order::default());
    }

    #[test]
    fn test_index_without_property() {
        kvgraph_testhelpers::setup();
        let mut order = Order::default();
        let skip = apply(&mut order, "0:Sku", "x").unwrap_err();
        insta::assert_snapshot!(skip, @"index 0 does not follow a property");

        let skip = apply(&mut order, "Number:0", "1").unwrap_err();
        insta::assert_snapshot!(skip, @"i64 is not a list");

        let skip = apply(&mut order, "Matrix:0:1", "1").unwrap_err();
        insta::assert_snapshot!(skip, @"index 1 does not follow a property");

        let skip = apply(&mut order, "Shipping:0", "1").unwrap_err();
        insta::assert_snapshot!(skip, @"Line is not a list");

        let skip = apply(&mut order, "Tags:Count", "1").unwrap_err();
        insta::assert_snapshot!(skip, @r#"cannot look up "Count" in Vec<String>"#);
        assert_eq!(order, Order::default());
    }

    #[test]
    fn test_scalar_has_no_children() {
        kvgraph_testhelpers::setup();
        let mut order = Order::default();
        let skip = apply(&mut order, "Note:Length", "1").unwrap_err();
        insta::assert_snapshot!(skip, @r#"cannot look up "Length" in String"#);

        let skip = apply(&mut order, "Tags:0:Length", "1").unwrap_err();
        assert!(matches!(skip, PathSkip::NotNavigable { .. }));
        assert_eq!(order, Order::default());
    }

    #[test]
    fn test_unconvertible_value_leaves_property() {
        kvgraph_testhelpers::setup();
        let mut order = Order::default();
        apply(&mut order, "Number", 3).unwrap();
        let skip = apply(&mut order, "Number", "three").unwrap_err();
        insta::assert_snapshot!(skip, @"cannot assign a string value to i64");
        assert_eq!(order.number, 3);
    }
}
