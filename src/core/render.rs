//! Type tree rendering — turn a [`TypeNode`] into plain display rows.
//!
//! The output is presentation data only: every number and flag is formatted
//! into a string here, so the display tree owns nothing from the parse and the
//! parse result can be dropped as soon as rendering returns.

use serde::Serialize;

use super::types::{Declaration, Member, ParseResult, TypeClass, TypeKind, TypeNode};

// ───────────────────────────────────────── display model ─────

/// One row of the display tree: a label, an optional value column and
/// ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayNode {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DisplayNode>,
}

impl DisplayNode {
    /// A leaf row with a value column.
    pub fn row(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    /// A grouping row with no value.
    pub fn group(label: impl Into<String>, children: Vec<DisplayNode>) -> Self {
        Self {
            label: label.into(),
            value: None,
            children,
        }
    }
}

#[cfg(test)]
impl DisplayNode {
    /// First direct child with the given label.
    pub fn child(&self, label: &str) -> Option<&DisplayNode> {
        self.children.iter().find(|c| c.label == label)
    }

    /// Value of the first direct child with the given label.
    pub fn child_value(&self, label: &str) -> Option<&str> {
        self.child(label).and_then(|c| c.value.as_deref())
    }
}

/// The rendered parse: `Types`, `Variables`, `Functions`, always in that
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DisplayForest {
    pub groups: Vec<DisplayNode>,
}

impl DisplayForest {
    #[cfg(test)]
    pub fn group(&self, label: &str) -> Option<&DisplayNode> {
        self.groups.iter().find(|g| g.label == label)
    }

    /// Indented plain-text dump, two spaces per level, `label: value`.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for group in &self.groups {
            write_text(group, 0, &mut out);
        }
        out
    }
}

fn write_text(node: &DisplayNode, depth: usize, out: &mut String) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(&node.label);
    if let Some(value) = &node.value {
        out.push_str(": ");
        out.push_str(value);
    }
    out.push('\n');
    for child in &node.children {
        write_text(child, depth + 1, out);
    }
}

// ───────────────────────────────────────── formatting ────────

/// Hex in the `0x1f` / `-0x8` style.
pub fn hex(v: u64) -> String {
    format!("{v:#x}")
}

pub fn hex_signed(v: i64) -> String {
    if v < 0 {
        format!("-{:#x}", v.unsigned_abs())
    } else {
        format!("{v:#x}")
    }
}

/// Booleans are shown as `True` / `False`.
pub fn bool_str(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

// ───────────────────────────────────────── rendering ─────────

/// Display label for a type class.
pub fn class_label(class: TypeClass) -> &'static str {
    match class {
        TypeClass::Void => "void",
        TypeClass::Bool => "bool",
        TypeClass::Integer => "int",
        TypeClass::Float => "float",
        TypeClass::Structure => "struct",
        TypeClass::Enumeration => "enum",
        TypeClass::Pointer => "pointer",
        TypeClass::Array => "array",
        TypeClass::Function => "function",
        TypeClass::VarArgs => "varargs",
        TypeClass::Value => "ValueTypeClass",
        TypeClass::NamedTypeReference => "named_type",
        TypeClass::WideChar => "wchar",
        TypeClass::Unknown => "???",
    }
}

/// Render one type.  `width` and `alignment` always come first, then the
/// class-specific rows.
pub fn render(node: &TypeNode) -> DisplayNode {
    let mut rows = vec![
        DisplayNode::row("width", hex(node.width)),
        DisplayNode::row("alignment", hex(node.alignment)),
    ];

    match &node.kind {
        TypeKind::Integer { signed } => {
            rows.push(DisplayNode::row("signed", bool_str(*signed)));
        }
        TypeKind::Structure {
            variant,
            packed,
            members,
        } => {
            rows.push(DisplayNode::row("type", variant.to_string()));
            rows.push(DisplayNode::row("packed", bool_str(*packed)));
            rows.push(render_members("members", members));
        }
        TypeKind::Enumeration { members } => {
            rows.push(render_members("members", members));
        }
        TypeKind::Pointer { target } => {
            rows.push(DisplayNode::group("target", vec![render(target)]));
        }
        TypeKind::Array {
            count,
            element_type,
        } => {
            rows.push(DisplayNode::row("count", hex(*count)));
            rows.push(DisplayNode::group("element_type", vec![render(element_type)]));
        }
        TypeKind::Function(f) => {
            rows.push(DisplayNode::row(
                "stack_adjustment",
                hex_signed(f.stack_adjustment),
            ));
            rows.push(DisplayNode::row(
                "calling_convention",
                f.calling_convention.as_deref().unwrap_or("None"),
            ));
            rows.push(DisplayNode::row(
                "has_variable_arguments",
                bool_str(f.has_variable_arguments),
            ));
            rows.push(DisplayNode::row("can_return", bool_str(f.can_return)));
            rows.push(DisplayNode::group(
                "return_value",
                vec![render(&f.return_value)],
            ));
            rows.push(render_members("parameters", &f.parameters));
        }
        TypeKind::NamedTypeReference {
            named_type_class,
            type_id,
            name,
        } => {
            rows.push(DisplayNode::row(
                "named_type_class",
                named_type_class.to_string(),
            ));
            rows.push(DisplayNode::row("type_id", type_id.clone()));
            rows.push(DisplayNode::row("name", name.clone()));
        }
        TypeKind::Void
        | TypeKind::Bool
        | TypeKind::Float
        | TypeKind::VarArgs
        | TypeKind::Value
        | TypeKind::WideChar
        | TypeKind::Unknown => {}
    }

    DisplayNode::group(class_label(node.class()), rows)
}

/// A `members` / `parameters` group: one row per entry, valued by its hex
/// offset, with the entry's type rendered beneath it.
fn render_members(label: &str, members: &[Member]) -> DisplayNode {
    let children = members
        .iter()
        .map(|m| DisplayNode {
            label: m.name.clone(),
            value: Some(hex(m.offset)),
            children: vec![render(&m.ty)],
        })
        .collect();
    DisplayNode::group(label, children)
}

fn render_declarations(label: &str, decls: &[Declaration]) -> DisplayNode {
    let children = decls
        .iter()
        .map(|d| DisplayNode::group(d.name.clone(), vec![render(&d.ty)]))
        .collect();
    DisplayNode::group(label, children)
}

/// Render a whole parse into the three top-level groups.
pub fn render_result(result: &ParseResult) -> DisplayForest {
    DisplayForest {
        groups: vec![
            render_declarations("Types", &result.types),
            render_declarations("Variables", &result.variables),
            render_declarations("Functions", &result.functions),
        ],
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::types::{FunctionType, NamedTypeClass, StructureVariant};

    use proptest::prelude::*;

    pub(crate) fn int32() -> TypeNode {
        TypeNode::new(4, 4, TypeKind::Integer { signed: true })
    }

    pub(crate) fn point() -> TypeNode {
        TypeNode::new(
            8,
            4,
            TypeKind::Structure {
                variant: StructureVariant::Struct,
                packed: false,
                members: vec![Member::new("x", 0, int32()), Member::new("y", 4, int32())],
            },
        )
    }

    pub(crate) fn point_result() -> ParseResult {
        ParseResult {
            types: vec![Declaration {
                name: "Point".into(),
                ty: point(),
            }],
            ..ParseResult::default()
        }
    }

    fn labels(node: &DisplayNode) -> Vec<&str> {
        node.children.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn point_renders_members_by_name_and_offset() {
        let forest = render_result(&point_result());
        let types = forest.group("Types").unwrap();
        assert_eq!(labels(types), ["Point"]);

        let point = &types.children[0];
        assert_eq!(point.value, None);
        assert_eq!(point.children.len(), 1);
        let st = &point.children[0];
        assert_eq!(st.label, "struct");
        assert_eq!(labels(st), ["width", "alignment", "type", "packed", "members"]);
        assert_eq!(st.child_value("width"), Some("0x8"));
        assert_eq!(st.child_value("type"), Some("struct"));
        assert_eq!(st.child_value("packed"), Some("False"));

        let members = st.child("members").unwrap();
        assert_eq!(labels(members), ["x", "y"]);
        assert_eq!(members.children[0].value.as_deref(), Some("0x0"));
        assert_eq!(members.children[1].value.as_deref(), Some("0x4"));
        assert_eq!(members.children[1].children[0].label, "int");
        assert_eq!(members.children[1].children[0].child_value("signed"), Some("True"));
    }

    #[test]
    fn forest_always_has_three_groups_in_order() {
        let forest = render_result(&ParseResult::default());
        let names: Vec<_> = forest.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(names, ["Types", "Variables", "Functions"]);
        assert!(forest.groups.iter().all(|g| g.children.is_empty()));
    }

    #[test]
    fn unknown_class_renders_placeholder() {
        let node = render(&TypeNode::new(0x10, 2, TypeKind::Unknown));
        assert_eq!(node.label, "???");
        assert_eq!(labels(&node), ["width", "alignment"]);
        assert_eq!(node.child_value("width"), Some("0x10"));
    }

    #[test]
    fn scalar_labels() {
        let cases = [
            (TypeKind::Void, "void"),
            (TypeKind::Bool, "bool"),
            (TypeKind::Float, "float"),
            (TypeKind::VarArgs, "varargs"),
            (TypeKind::Value, "ValueTypeClass"),
            (TypeKind::WideChar, "wchar"),
        ];
        for (kind, label) in cases {
            let node = render(&TypeNode::new(2, 2, kind));
            assert_eq!(node.label, label);
            assert_eq!(labels(&node), ["width", "alignment"]);
        }
    }

    #[test]
    fn array_of_pointers() {
        let ptr = TypeNode::new(
            8,
            8,
            TypeKind::Pointer {
                target: Box::new(int32()),
            },
        );
        let arr = TypeNode::new(
            0xa0,
            8,
            TypeKind::Array {
                count: 20,
                element_type: Box::new(ptr),
            },
        );
        let node = render(&arr);
        assert_eq!(labels(&node), ["width", "alignment", "count", "element_type"]);
        assert_eq!(node.child_value("width"), Some("0xa0"));
        assert_eq!(node.child_value("count"), Some("0x14"));
        let elem = node.child("element_type").unwrap();
        assert_eq!(elem.children.len(), 1);
        assert_eq!(elem.children[0].label, "pointer");
        let target = elem.children[0].child("target").unwrap();
        assert_eq!(labels(target), ["int"]);
    }

    #[test]
    fn function_rows() {
        let f = TypeNode::new(
            0,
            1,
            TypeKind::Function(FunctionType {
                stack_adjustment: -8,
                calling_convention: None,
                has_variable_arguments: true,
                can_return: false,
                return_value: Box::new(TypeNode::new(0, 1, TypeKind::Void)),
                parameters: vec![Member::new("fmt", 0, int32()), Member::new("n", 1, int32())],
            }),
        );
        let node = render(&f);
        assert_eq!(node.label, "function");
        assert_eq!(
            labels(&node),
            [
                "width",
                "alignment",
                "stack_adjustment",
                "calling_convention",
                "has_variable_arguments",
                "can_return",
                "return_value",
                "parameters",
            ]
        );
        assert_eq!(node.child_value("stack_adjustment"), Some("-0x8"));
        assert_eq!(node.child_value("calling_convention"), Some("None"));
        assert_eq!(node.child_value("has_variable_arguments"), Some("True"));
        assert_eq!(node.child_value("can_return"), Some("False"));
        assert_eq!(labels(node.child("return_value").unwrap()), ["void"]);
        let params = node.child("parameters").unwrap();
        assert_eq!(labels(params), ["fmt", "n"]);
        assert_eq!(params.children[1].value.as_deref(), Some("0x1"));
    }

    #[test]
    fn calling_convention_name_is_shown() {
        let f = TypeNode::new(
            0,
            1,
            TypeKind::Function(FunctionType {
                stack_adjustment: 0,
                calling_convention: Some("stdcall".into()),
                has_variable_arguments: false,
                can_return: true,
                return_value: Box::new(int32()),
                parameters: Vec::new(),
            }),
        );
        let node = render(&f);
        assert_eq!(node.child_value("calling_convention"), Some("stdcall"));
        assert!(node.child("parameters").unwrap().children.is_empty());
    }

    #[test]
    fn named_reference_keeps_type_id_verbatim() {
        let named = TypeNode::new(
            0,
            1,
            TypeKind::NamedTypeReference {
                named_type_class: NamedTypeClass::Struct,
                type_id: "a1b2:Point".into(),
                name: "Point".into(),
            },
        );
        let node = render(&named);
        assert_eq!(node.label, "named_type");
        assert_eq!(node.child_value("named_type_class"), Some("struct"));
        assert_eq!(node.child_value("type_id"), Some("a1b2:Point"));
        assert_eq!(node.child_value("name"), Some("Point"));
    }

    #[test]
    fn enumeration_members() {
        let e = TypeNode::new(
            4,
            4,
            TypeKind::Enumeration {
                members: vec![Member::new("RED", 0, int32()), Member::new("BLUE", 2, int32())],
            },
        );
        let node = render(&e);
        assert_eq!(node.label, "enum");
        assert_eq!(labels(&node), ["width", "alignment", "members"]);
        assert_eq!(labels(node.child("members").unwrap()), ["RED", "BLUE"]);
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(hex(0), "0x0");
        assert_eq!(hex(255), "0xff");
        assert_eq!(hex_signed(0), "0x0");
        assert_eq!(hex_signed(16), "0x10");
        assert_eq!(hex_signed(-8), "-0x8");
        assert_eq!(hex_signed(i64::MIN), "-0x8000000000000000");
    }

    #[test]
    fn text_dump() {
        let text = render_result(&point_result()).to_text();
        let expected = "\
Types
  Point
    struct
      width: 0x8
      alignment: 0x4
      type: struct
      packed: False
      members
        x: 0x0
          int
            width: 0x4
            alignment: 0x4
            signed: True
        y: 0x4
          int
            width: 0x4
            alignment: 0x4
            signed: True
Variables
Functions
";
        assert_eq!(text, expected);
    }

    #[test]
    fn json_dump_omits_empty_fields() {
        let json = serde_json::to_value(render_result(&ParseResult::default())).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"label": "Types"},
                {"label": "Variables"},
                {"label": "Functions"}
            ])
        );
    }

    // ── properties ──────────────────────────────────────────────

    fn arb_member(inner: impl Strategy<Value = TypeNode>) -> impl Strategy<Value = Member> {
        ("[a-z_][a-z0-9_]{0,6}", any::<u64>(), inner)
            .prop_map(|(name, offset, ty)| Member::new(name, offset, ty))
    }

    fn arb_type() -> impl Strategy<Value = TypeNode> {
        let leaf = (any::<u64>(), any::<u64>(), 0u8..8).prop_map(|(w, a, tag)| {
            let kind = match tag {
                0 => TypeKind::Void,
                1 => TypeKind::Bool,
                2 => TypeKind::Integer { signed: w % 2 == 0 },
                3 => TypeKind::Float,
                4 => TypeKind::VarArgs,
                5 => TypeKind::Value,
                6 => TypeKind::WideChar,
                _ => TypeKind::Unknown,
            };
            TypeNode::new(w, a, kind)
        });
        leaf.prop_recursive(4, 48, 4, |inner| {
            prop_oneof![
                (any::<u64>(), any::<bool>(), prop::collection::vec(arb_member(inner.clone()), 0..4))
                    .prop_map(|(w, packed, members)| TypeNode::new(
                        w,
                        8,
                        TypeKind::Structure {
                            variant: StructureVariant::Struct,
                            packed,
                            members,
                        },
                    )),
                inner.clone().prop_map(|t| TypeNode::new(
                    8,
                    8,
                    TypeKind::Pointer { target: Box::new(t) },
                )),
                (any::<u64>(), inner.clone()).prop_map(|(count, t)| TypeNode::new(
                    t.width.wrapping_mul(count),
                    t.alignment,
                    TypeKind::Array {
                        count,
                        element_type: Box::new(t),
                    },
                )),
                (any::<i64>(), inner.clone(), prop::collection::vec(arb_member(inner), 0..3))
                    .prop_map(|(adj, ret, parameters)| TypeNode::new(
                        0,
                        1,
                        TypeKind::Function(FunctionType {
                            stack_adjustment: adj,
                            calling_convention: None,
                            has_variable_arguments: false,
                            can_return: true,
                            return_value: Box::new(ret),
                            parameters,
                        }),
                    )),
            ]
        })
    }

    fn nested<'a>(node: &'a DisplayNode, label: &str) -> &'a DisplayNode {
        &node.child(label).unwrap().children[0]
    }

    /// Walk a type and its rendering in lockstep, checking the width and
    /// alignment rows of every node.
    fn check_sizes(ty: &TypeNode, node: &DisplayNode) {
        assert_eq!(node.child_value("width"), Some(hex(ty.width).as_str()));
        assert_eq!(node.child_value("alignment"), Some(hex(ty.alignment).as_str()));
        match &ty.kind {
            TypeKind::Structure { members, .. } | TypeKind::Enumeration { members } => {
                let group = node.child("members").unwrap();
                for (m, row) in members.iter().zip(&group.children) {
                    check_sizes(&m.ty, &row.children[0]);
                }
            }
            TypeKind::Pointer { target } => check_sizes(target, nested(node, "target")),
            TypeKind::Array { element_type, .. } => {
                check_sizes(element_type, nested(node, "element_type"))
            }
            TypeKind::Function(f) => {
                check_sizes(&f.return_value, nested(node, "return_value"));
                let group = node.child("parameters").unwrap();
                for (p, row) in f.parameters.iter().zip(&group.children) {
                    check_sizes(&p.ty, &row.children[0]);
                }
            }
            _ => {}
        }
    }

    proptest! {
        #[test]
        fn render_is_deterministic(ty in arb_type()) {
            prop_assert_eq!(render(&ty), render(&ty));
        }

        #[test]
        fn sizes_round_trip_through_hex(ty in arb_type()) {
            check_sizes(&ty, &render(&ty));
        }

        #[test]
        fn members_keep_count_and_order(members in prop::collection::vec(arb_member(arb_type()), 0..8)) {
            let ty = TypeNode::new(0, 1, TypeKind::Structure {
                variant: StructureVariant::Union,
                packed: true,
                members: members.clone(),
            });
            let node = render(&ty);
            let group = node.child("members").unwrap();
            prop_assert_eq!(group.children.len(), members.len());
            for (m, row) in members.iter().zip(&group.children) {
                prop_assert_eq!(&row.label, &m.name);
                prop_assert_eq!(row.value.clone(), Some(hex(m.offset)));
            }
        }

        #[test]
        fn booleans_are_words(signed in any::<bool>()) {
            let node = render(&TypeNode::new(4, 4, TypeKind::Integer { signed }));
            let v = node.child_value("signed").unwrap();
            prop_assert!(v == "True" || v == "False");
        }
    }
}
