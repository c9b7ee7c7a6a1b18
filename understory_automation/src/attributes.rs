// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute tables.
//!
//! Every scalar and list attribute the proxy exposes is listed exactly once in
//! one of the tables below. A table entry yields an enum variant (used to ask
//! the bridge), the host's attribute name, and a typed getter on [`Node`].
//! Adding an entry is the only way to expose a new attribute.
//!
//! Relations are declared on top of the int and int-list tables: the source
//! attribute holds node ids in the same tree, and the forward getter resolves
//! them through [`Tree::get`](crate::Tree::get). Reverse getters ask the host
//! which nodes point at this one. Ids that no longer resolve are dropped.

use crate::ids::NodeId;
use crate::node::Node;

macro_rules! attribute_table {
    (
        $(#[$meta:meta])*
        $enum:ident => $ty:ty, $getter:ident;
        $( $variant:ident => $name:literal, $method:ident; )*
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum $enum {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
        }

        impl $enum {
            /// Every entry of the table, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            /// Host name of the attribute.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// Look up an attribute by its host name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Self::$variant),)*
                    _ => None,
                }
            }
        }

        impl Node {
            $(
                #[doc = concat!("The `", $name, "` attribute, or `None` when absent or detached.")]
                pub fn $method(&self) -> Option<$ty> {
                    self.$getter($enum::$variant)
                }
            )*
        }
    };
}

macro_rules! node_ref_relations {
    ($( $source:ident => $forward:ident $(, $reverse:ident)?; )*) => {
        impl Node {
            $(
                #[doc = concat!("Node named by [`IntAttribute::", stringify!($source), "`].")]
                pub fn $forward(&self) -> Option<Node> {
                    self.int_relation(IntAttribute::$source)
                }

                $(
                    #[doc = concat!("Nodes whose [`IntAttribute::", stringify!($source), "`] names this node.")]
                    pub fn $reverse(&self) -> Vec<Node> {
                        self.int_reverse_relation(IntAttribute::$source)
                    }
                )?
            )*
        }
    };
}

macro_rules! node_ref_list_relations {
    ($( $source:ident => $forward:ident $(, $reverse:ident)?; )*) => {
        impl Node {
            $(
                #[doc = concat!("Nodes named by [`IntListAttribute::", stringify!($source), "`].")]
                pub fn $forward(&self) -> Vec<Node> {
                    self.int_list_relation(IntListAttribute::$source)
                }

                $(
                    #[doc = concat!("Nodes whose [`IntListAttribute::", stringify!($source), "`] names this node.")]
                    pub fn $reverse(&self) -> Vec<Node> {
                        self.int_list_reverse_relation(IntListAttribute::$source)
                    }
                )?
            )*
        }
    };
}

attribute_table! {
    /// String-valued attributes.
    StringAttribute => String, string_attribute;
    AccessKey => "accessKey", access_key;
    AppId => "appId", app_id;
    AriaCellColumnIndexText => "ariaCellColumnIndexText", aria_cell_column_index_text;
    AriaCellRowIndexText => "ariaCellRowIndexText", aria_cell_row_index_text;
    AutoComplete => "autoComplete", auto_complete;
    CheckedStateDescription => "checkedStateDescription", checked_state_description;
    ChildTreeId => "childTreeId", child_tree_id;
    ClassName => "className", class_name;
    ContainerLiveRelevant => "containerLiveRelevant", container_live_relevant;
    ContainerLiveStatus => "containerLiveStatus", container_live_status;
    Description => "description", description;
    Display => "display", display;
    DoDefaultLabel => "doDefaultLabel", do_default_label;
    FontFamily => "fontFamily", font_family;
    HtmlId => "htmlId", html_id;
    HtmlTag => "htmlTag", html_tag;
    ImageDataUrl => "imageDataUrl", image_data_url;
    InputType => "inputType", input_type;
    Language => "language", language;
    LiveRelevant => "liveRelevant", live_relevant;
    LiveStatus => "liveStatus", live_status;
    LongClickLabel => "longClickLabel", long_click_label;
    MathContent => "mathContent", math_content;
    Placeholder => "placeholder", placeholder;
    RoleDescription => "roleDescription", role_description;
    Tooltip => "tooltip", tooltip;
    Url => "url", url;
}

attribute_table! {
    /// Boolean attributes.
    BoolAttribute => bool, bool_attribute;
    Busy => "busy", busy;
    Clickable => "clickable", clickable;
    ContainerLiveAtomic => "containerLiveAtomic", container_live_atomic;
    ContainerLiveBusy => "containerLiveBusy", container_live_busy;
    HasHiddenOffscreenNodes => "hasHiddenOffscreenNodes", has_hidden_offscreen_nodes;
    NonAtomicTextFieldRoot => "nonAtomicTextFieldRoot", non_atomic_text_field_root;
    LiveAtomic => "liveAtomic", live_atomic;
    Modal => "modal", modal;
    NotUserSelectableStyle => "notUserSelectableStyle", not_user_selectable_style;
    Scrollable => "scrollable", scrollable;
    Selected => "selected", selected;
    SupportsTextLocation => "supportsTextLocation", supports_text_location;
}

attribute_table! {
    /// Integer attributes, including the id sources of single-node relations.
    IntAttribute => i32, int_attribute;
    BackgroundColor => "backgroundColor", background_color;
    Color => "color", color;
    ColorValue => "colorValue", color_value;
    HierarchicalLevel => "hierarchicalLevel", hierarchical_level;
    PosInSet => "posInSet", pos_in_set;
    ScrollX => "scrollX", scroll_x;
    ScrollXMax => "scrollXMax", scroll_x_max;
    ScrollXMin => "scrollXMin", scroll_x_min;
    ScrollY => "scrollY", scroll_y;
    ScrollYMax => "scrollYMax", scroll_y_max;
    ScrollYMin => "scrollYMin", scroll_y_min;
    SetSize => "setSize", size_of_set;
    TableCellColumnSpan => "tableCellColumnSpan", table_cell_column_span;
    TableCellRowSpan => "tableCellRowSpan", table_cell_row_span;
    TableCellColumnIndex => "tableCellColumnIndex", table_cell_column_index;
    TableCellRowIndex => "tableCellRowIndex", table_cell_row_index;
    TableCellAriaColumnIndex => "tableCellAriaColumnIndex", table_cell_aria_column_index;
    TableCellAriaRowIndex => "tableCellAriaRowIndex", table_cell_aria_row_index;
    TableColumnCount => "tableColumnCount", table_column_count;
    TableRowCount => "tableRowCount", table_row_count;
    AriaColumnCount => "ariaColumnCount", aria_column_count;
    AriaRowCount => "ariaRowCount", aria_row_count;
    TextSelEnd => "textSelEnd", text_sel_end;
    TextSelStart => "textSelStart", text_sel_start;
    ActiveDescendantId => "activedescendantId", active_descendant_id;
    InPageLinkTargetId => "inPageLinkTargetId", in_page_link_target_id;
    NextFocusId => "nextFocusId", next_focus_id;
    NextOnLineId => "nextOnLineId", next_on_line_id;
    NextWindowFocusId => "nextWindowFocusId", next_window_focus_id;
    PreviousFocusId => "previousFocusId", previous_focus_id;
    PreviousOnLineId => "previousOnLineId", previous_on_line_id;
    PreviousWindowFocusId => "previousWindowFocusId", previous_window_focus_id;
    TableColumnHeaderId => "tableColumnHeaderId", table_column_header_id;
    TableHeaderId => "tableHeaderId", table_header_id;
    TableRowHeaderId => "tableRowHeaderId", table_row_header_id;
}

attribute_table! {
    /// Floating point attributes.
    FloatAttribute => f32, float_attribute;
    FontSize => "fontSize", font_size;
    MaxValueForRange => "maxValueForRange", max_value_for_range;
    MinValueForRange => "minValueForRange", min_value_for_range;
    ValueForRange => "valueForRange", value_for_range;
}

attribute_table! {
    /// Integer list attributes: text offsets, markers, and the id sources of
    /// multi-node relations.
    IntListAttribute => Vec<i32>, int_list_attribute;
    WordStarts => "wordStarts", word_starts;
    WordEnds => "wordEnds", word_ends;
    NonInlineTextWordStarts => "nonInlineTextWordStarts", non_inline_text_word_starts;
    NonInlineTextWordEnds => "nonInlineTextWordEnds", non_inline_text_word_ends;
    LineStarts => "lineStarts", line_start_offsets;
    SentenceStarts => "sentenceStarts", sentence_starts;
    SentenceEnds => "sentenceEnds", sentence_ends;
    MarkerTypes => "markerTypes", marker_types;
    ControlsIds => "controlsIds", controls_ids;
    DescribedbyIds => "describedbyIds", describedby_ids;
    DetailsIds => "detailsIds", details_ids;
    ErrorMessageIds => "errorMessageIds", error_message_ids;
    FlowtoIds => "flowtoIds", flowto_ids;
    LabelledbyIds => "labelledbyIds", labelledby_ids;
    TableCellColumnHeaderIds => "tableCellColumnHeaderIds", table_cell_column_header_ids;
    TableCellRowHeaderIds => "tableCellRowHeaderIds", table_cell_row_header_ids;
}

node_ref_relations! {
    ActiveDescendantId => active_descendant, active_descendant_for;
    InPageLinkTargetId => in_page_link_target;
    NextFocusId => next_focus;
    NextOnLineId => next_on_line;
    NextWindowFocusId => next_window_focus;
    PreviousFocusId => previous_focus;
    PreviousOnLineId => previous_on_line;
    PreviousWindowFocusId => previous_window_focus;
    TableColumnHeaderId => table_column_header;
    TableHeaderId => table_header;
    TableRowHeaderId => table_row_header;
}

node_ref_list_relations! {
    ControlsIds => controls, controlled_by;
    DescribedbyIds => described_by, description_for;
    DetailsIds => details, details_for;
    ErrorMessageIds => error_message, error_message_for;
    FlowtoIds => flow_to, flow_from;
    LabelledbyIds => labelled_by, label_for;
    TableCellColumnHeaderIds => table_cell_column_headers;
    TableCellRowHeaderIds => table_cell_row_headers;
}

/// Any attribute that can be read generically, for example by
/// [`FindParams`](crate::FindParams).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// A string table entry.
    String(StringAttribute),
    /// A boolean table entry.
    Bool(BoolAttribute),
    /// An integer table entry.
    Int(IntAttribute),
    /// A float table entry.
    Float(FloatAttribute),
    /// An integer list table entry.
    IntList(IntListAttribute),
    /// The accessible name.
    Name,
    /// The value.
    Value,
}

impl Attribute {
    /// Host name of the attribute.
    pub const fn name(self) -> &'static str {
        match self {
            Self::String(a) => a.name(),
            Self::Bool(a) => a.name(),
            Self::Int(a) => a.name(),
            Self::Float(a) => a.name(),
            Self::IntList(a) => a.name(),
            Self::Name => "name",
            Self::Value => "value",
        }
    }

    /// Look up an attribute by host name across every table.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Name),
            "value" => Some(Self::Value),
            _ => StringAttribute::from_name(name)
                .map(Self::String)
                .or_else(|| BoolAttribute::from_name(name).map(Self::Bool))
                .or_else(|| IntAttribute::from_name(name).map(Self::Int))
                .or_else(|| FloatAttribute::from_name(name).map(Self::Float))
                .or_else(|| IntListAttribute::from_name(name).map(Self::IntList)),
        }
    }
}

impl From<StringAttribute> for Attribute {
    fn from(a: StringAttribute) -> Self {
        Self::String(a)
    }
}

impl From<BoolAttribute> for Attribute {
    fn from(a: BoolAttribute) -> Self {
        Self::Bool(a)
    }
}

impl From<IntAttribute> for Attribute {
    fn from(a: IntAttribute) -> Self {
        Self::Int(a)
    }
}

impl From<FloatAttribute> for Attribute {
    fn from(a: FloatAttribute) -> Self {
        Self::Float(a)
    }
}

impl From<IntListAttribute> for Attribute {
    fn from(a: IntListAttribute) -> Self {
        Self::IntList(a)
    }
}

/// Value of an [`Attribute`].
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    /// String value.
    String(String),
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i32),
    /// Float value.
    Float(f32),
    /// Integer list value.
    IntList(Vec<i32>),
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for AttributeValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl Node {
    /// Read a string attribute.
    pub fn string_attribute(&self, attr: StringAttribute) -> Option<String> {
        self.with_bridge(|bridge, tree, id| bridge.string_attribute(tree, id, attr))
    }

    /// Read a boolean attribute. `Some(false)` and `None` are distinct.
    pub fn bool_attribute(&self, attr: BoolAttribute) -> Option<bool> {
        self.with_bridge(|bridge, tree, id| bridge.bool_attribute(tree, id, attr))
    }

    /// Read an integer attribute.
    pub fn int_attribute(&self, attr: IntAttribute) -> Option<i32> {
        self.with_bridge(|bridge, tree, id| bridge.int_attribute(tree, id, attr))
    }

    /// Read a float attribute.
    pub fn float_attribute(&self, attr: FloatAttribute) -> Option<f32> {
        self.with_bridge(|bridge, tree, id| bridge.float_attribute(tree, id, attr))
    }

    /// Read an integer list attribute.
    pub fn int_list_attribute(&self, attr: IntListAttribute) -> Option<Vec<i32>> {
        self.with_bridge(|bridge, tree, id| bridge.int_list_attribute(tree, id, attr))
    }

    /// Read any attribute generically.
    pub fn attribute(&self, attr: Attribute) -> Option<AttributeValue> {
        match attr {
            Attribute::String(a) => self.string_attribute(a).map(AttributeValue::String),
            Attribute::Bool(a) => self.bool_attribute(a).map(AttributeValue::Bool),
            Attribute::Int(a) => self.int_attribute(a).map(AttributeValue::Int),
            Attribute::Float(a) => self.float_attribute(a).map(AttributeValue::Float),
            Attribute::IntList(a) => self.int_list_attribute(a).map(AttributeValue::IntList),
            Attribute::Name => self.name().map(AttributeValue::String),
            Attribute::Value => self.value().map(AttributeValue::String),
        }
    }

    fn int_relation(&self, attr: IntAttribute) -> Option<Self> {
        let id = self.int_attribute(attr)?;
        self.tree()?.get(NodeId(id))
    }

    fn int_reverse_relation(&self, attr: IntAttribute) -> Vec<Self> {
        let ids =
            self.with_bridge(|bridge, tree, id| Some(bridge.int_reverse_relations(tree, id, attr)));
        self.resolve_local(ids.unwrap_or_default())
    }

    fn int_list_relation(&self, attr: IntListAttribute) -> Vec<Self> {
        let ids = self
            .int_list_attribute(attr)
            .unwrap_or_default()
            .into_iter()
            .map(NodeId)
            .collect();
        self.resolve_local(ids)
    }

    fn int_list_reverse_relation(&self, attr: IntListAttribute) -> Vec<Self> {
        let ids = self.with_bridge(|bridge, tree, id| {
            Some(bridge.int_list_reverse_relations(tree, id, attr))
        });
        self.resolve_local(ids.unwrap_or_default())
    }

    /// Map ids in this node's tree to proxies, dropping ids that do not resolve.
    fn resolve_local(&self, ids: Vec<NodeId>) -> Vec<Self> {
        let Some(tree) = self.tree() else {
            return Vec::new();
        };
        ids.into_iter().filter_map(|id| tree.get(id)).collect()
    }
}
