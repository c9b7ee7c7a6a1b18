// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value vocabulary reported by the host: roles, states, events, and friends.

use crate::ids::NodeId;

/// Semantic role of a node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[allow(missing_docs, reason = "role names are self-describing")]
pub enum Role {
    #[default]
    Unknown,
    Alert,
    AlertDialog,
    Application,
    Article,
    Audio,
    Banner,
    Button,
    Canvas,
    Caret,
    Cell,
    CheckBox,
    Client,
    ColumnHeader,
    ComboBoxGrouping,
    ComboBoxMenuButton,
    Complementary,
    ContentInfo,
    Desktop,
    Dialog,
    Document,
    EmbeddedObject,
    Figure,
    Form,
    GenericContainer,
    Grid,
    Group,
    Heading,
    Iframe,
    IframePresentational,
    Image,
    InlineTextBox,
    Label,
    Link,
    List,
    ListBox,
    ListBoxOption,
    ListItem,
    Main,
    Menu,
    MenuBar,
    MenuItem,
    MenuItemCheckBox,
    MenuItemRadio,
    MenuListPopup,
    Navigation,
    Pane,
    ProgressIndicator,
    RadioButton,
    RadioGroup,
    Region,
    RootWebArea,
    Row,
    RowHeader,
    ScrollBar,
    Search,
    SearchBox,
    Slider,
    SpinButton,
    Splitter,
    StaticText,
    Status,
    Switch,
    Tab,
    TabList,
    TabPanel,
    Table,
    TextField,
    TextFieldWithComboBox,
    Title,
    Toolbar,
    Tooltip,
    Tree,
    TreeItem,
    Video,
    WebView,
    Window,
}

impl Role {
    /// Host name of the role.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Alert => "alert",
            Self::AlertDialog => "alertDialog",
            Self::Application => "application",
            Self::Article => "article",
            Self::Audio => "audio",
            Self::Banner => "banner",
            Self::Button => "button",
            Self::Canvas => "canvas",
            Self::Caret => "caret",
            Self::Cell => "cell",
            Self::CheckBox => "checkBox",
            Self::Client => "client",
            Self::ColumnHeader => "columnHeader",
            Self::ComboBoxGrouping => "comboBoxGrouping",
            Self::ComboBoxMenuButton => "comboBoxMenuButton",
            Self::Complementary => "complementary",
            Self::ContentInfo => "contentInfo",
            Self::Desktop => "desktop",
            Self::Dialog => "dialog",
            Self::Document => "document",
            Self::EmbeddedObject => "embeddedObject",
            Self::Figure => "figure",
            Self::Form => "form",
            Self::GenericContainer => "genericContainer",
            Self::Grid => "grid",
            Self::Group => "group",
            Self::Heading => "heading",
            Self::Iframe => "iframe",
            Self::IframePresentational => "iframePresentational",
            Self::Image => "image",
            Self::InlineTextBox => "inlineTextBox",
            Self::Label => "labelText",
            Self::Link => "link",
            Self::List => "list",
            Self::ListBox => "listBox",
            Self::ListBoxOption => "listBoxOption",
            Self::ListItem => "listItem",
            Self::Main => "main",
            Self::Menu => "menu",
            Self::MenuBar => "menuBar",
            Self::MenuItem => "menuItem",
            Self::MenuItemCheckBox => "menuItemCheckBox",
            Self::MenuItemRadio => "menuItemRadio",
            Self::MenuListPopup => "menuListPopup",
            Self::Navigation => "navigation",
            Self::Pane => "pane",
            Self::ProgressIndicator => "progressIndicator",
            Self::RadioButton => "radioButton",
            Self::RadioGroup => "radioGroup",
            Self::Region => "region",
            Self::RootWebArea => "rootWebArea",
            Self::Row => "row",
            Self::RowHeader => "rowHeader",
            Self::ScrollBar => "scrollBar",
            Self::Search => "search",
            Self::SearchBox => "searchBox",
            Self::Slider => "slider",
            Self::SpinButton => "spinButton",
            Self::Splitter => "splitter",
            Self::StaticText => "staticText",
            Self::Status => "status",
            Self::Switch => "switch",
            Self::Tab => "tab",
            Self::TabList => "tabList",
            Self::TabPanel => "tabPanel",
            Self::Table => "table",
            Self::TextField => "textField",
            Self::TextFieldWithComboBox => "textFieldWithComboBox",
            Self::Title => "title",
            Self::Toolbar => "toolbar",
            Self::Tooltip => "tooltip",
            Self::Tree => "tree",
            Self::TreeItem => "treeItem",
            Self::Video => "video",
            Self::WebView => "webView",
            Self::Window => "window",
        }
    }
}

bitflags::bitflags! {
    /// Boolean state flags of a node.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct State: u32 {
        /// Autofill suggestions are available.
        const AUTOFILL_AVAILABLE = 1 << 0;
        /// Collapsed (for expandable nodes).
        const COLLAPSED = 1 << 1;
        /// Default button or option.
        const DEFAULT = 1 << 2;
        /// Content is editable.
        const EDITABLE = 1 << 3;
        /// Expanded (for expandable nodes).
        const EXPANDED = 1 << 4;
        /// Can take focus.
        const FOCUSABLE = 1 << 5;
        /// Currently focused.
        const FOCUSED = 1 << 6;
        /// Horizontal orientation.
        const HORIZONTAL = 1 << 7;
        /// Under the pointer.
        const HOVERED = 1 << 8;
        /// Ignored by assistive technology.
        const IGNORED = 1 << 9;
        /// Not rendered.
        const INVISIBLE = 1 << 10;
        /// Link with a target.
        const LINKED = 1 << 11;
        /// Multi-line text.
        const MULTILINE = 1 << 12;
        /// Allows more than one selected descendant.
        const MULTISELECTABLE = 1 << 13;
        /// Outside the visible viewport.
        const OFFSCREEN = 1 << 14;
        /// Protected content such as a password.
        const PROTECTED = 1 << 15;
        /// Input is required.
        const REQUIRED = 1 << 16;
        /// Rich text editing.
        const RICHLY_EDITABLE = 1 << 17;
        /// Vertical orientation.
        const VERTICAL = 1 << 18;
        /// Visited link.
        const VISITED = 1 << 19;
    }
}

bitflags::bitflags! {
    /// Text decoration of a node.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TextStyle: u8 {
        /// Bold.
        const BOLD = 1 << 0;
        /// Italic.
        const ITALIC = 1 << 1;
        /// Underlined.
        const UNDERLINE = 1 << 2;
        /// Struck through.
        const LINE_THROUGH = 1 << 3;
    }
}

/// Interaction restriction on a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Restriction {
    /// Cannot be interacted with.
    Disabled,
    /// Readable but not modifiable.
    ReadOnly,
}

/// Tri-state checked value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CheckedState {
    /// Unchecked.
    False,
    /// Checked.
    True,
    /// Indeterminate.
    Mixed,
}

/// Sort direction of a table header.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs, reason = "variant names are self-describing")]
pub enum SortDirection {
    Unsorted,
    Ascending,
    Descending,
    Other,
}

/// Kind of popup a node opens.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs, reason = "variant names are self-describing")]
pub enum HasPopup {
    False,
    True,
    Menu,
    Listbox,
    Tree,
    Grid,
    Dialog,
}

/// Which side of a line break a text position sticks to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[allow(missing_docs, reason = "variant names are self-describing")]
pub enum TextAffinity {
    Upstream,
    #[default]
    Downstream,
}

/// Accessibility event type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs, reason = "event names are self-describing")]
pub enum EventType {
    ActiveDescendantChanged,
    Alert,
    AriaAttributeChanged,
    AutocorrectionOccured,
    Blur,
    CheckedStateChanged,
    ChildrenChanged,
    Clicked,
    ControlsChanged,
    DocumentSelectionChanged,
    DocumentTitleChanged,
    ExpandedChanged,
    Focus,
    FocusAfterMenuClose,
    FocusContext,
    Hide,
    HitTestResult,
    Hover,
    ImageFrameUpdated,
    InvalidStatusChanged,
    LayoutComplete,
    LiveRegionChanged,
    LiveRegionCreated,
    LoadComplete,
    LoadStart,
    LocationChanged,
    MediaStartedPlaying,
    MediaStoppedPlaying,
    MenuEnd,
    MenuListValueChanged,
    MenuPopupEnd,
    MenuPopupStart,
    MenuStart,
    MouseCanceled,
    MouseDragged,
    MouseMoved,
    MousePressed,
    MouseReleased,
    RowCollapsed,
    RowCountChanged,
    RowExpanded,
    ScrollPositionChanged,
    ScrolledToAnchor,
    SelectedChildrenChanged,
    Selection,
    SelectionAdd,
    SelectionRemove,
    Show,
    StateChanged,
    TextChanged,
    TextSelectionChanged,
    TreeChanged,
    ValueInTextFieldChanged,
    WindowActivated,
    WindowDeactivated,
    WindowVisibilityChanged,
}

impl EventType {
    /// Host name of the event type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ActiveDescendantChanged => "activeDescendantChanged",
            Self::Alert => "alert",
            Self::AriaAttributeChanged => "ariaAttributeChanged",
            Self::AutocorrectionOccured => "autocorrectionOccured",
            Self::Blur => "blur",
            Self::CheckedStateChanged => "checkedStateChanged",
            Self::ChildrenChanged => "childrenChanged",
            Self::Clicked => "clicked",
            Self::ControlsChanged => "controlsChanged",
            Self::DocumentSelectionChanged => "documentSelectionChanged",
            Self::DocumentTitleChanged => "documentTitleChanged",
            Self::ExpandedChanged => "expandedChanged",
            Self::Focus => "focus",
            Self::FocusAfterMenuClose => "focusAfterMenuClose",
            Self::FocusContext => "focusContext",
            Self::Hide => "hide",
            Self::HitTestResult => "hitTestResult",
            Self::Hover => "hover",
            Self::ImageFrameUpdated => "imageFrameUpdated",
            Self::InvalidStatusChanged => "invalidStatusChanged",
            Self::LayoutComplete => "layoutComplete",
            Self::LiveRegionChanged => "liveRegionChanged",
            Self::LiveRegionCreated => "liveRegionCreated",
            Self::LoadComplete => "loadComplete",
            Self::LoadStart => "loadStart",
            Self::LocationChanged => "locationChanged",
            Self::MediaStartedPlaying => "mediaStartedPlaying",
            Self::MediaStoppedPlaying => "mediaStoppedPlaying",
            Self::MenuEnd => "menuEnd",
            Self::MenuListValueChanged => "menuListValueChanged",
            Self::MenuPopupEnd => "menuPopupEnd",
            Self::MenuPopupStart => "menuPopupStart",
            Self::MenuStart => "menuStart",
            Self::MouseCanceled => "mouseCanceled",
            Self::MouseDragged => "mouseDragged",
            Self::MouseMoved => "mouseMoved",
            Self::MousePressed => "mousePressed",
            Self::MouseReleased => "mouseReleased",
            Self::RowCollapsed => "rowCollapsed",
            Self::RowCountChanged => "rowCountChanged",
            Self::RowExpanded => "rowExpanded",
            Self::ScrollPositionChanged => "scrollPositionChanged",
            Self::ScrolledToAnchor => "scrolledToAnchor",
            Self::SelectedChildrenChanged => "selectedChildrenChanged",
            Self::Selection => "selection",
            Self::SelectionAdd => "selectionAdd",
            Self::SelectionRemove => "selectionRemove",
            Self::Show => "show",
            Self::StateChanged => "stateChanged",
            Self::TextChanged => "textChanged",
            Self::TextSelectionChanged => "textSelectionChanged",
            Self::TreeChanged => "treeChanged",
            Self::ValueInTextFieldChanged => "valueInTextFieldChanged",
            Self::WindowActivated => "windowActivated",
            Self::WindowDeactivated => "windowDeactivated",
            Self::WindowVisibilityChanged => "windowVisibilityChanged",
        }
    }

    /// Events that concern a whole tree rather than the node they were
    /// reported on. These are delivered to the tree's root.
    pub const fn is_tree_global(self) -> bool {
        matches!(self, Self::MediaStartedPlaying | Self::MediaStoppedPlaying)
    }
}

/// What caused an event.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum EventFrom {
    /// Unknown or not reported.
    #[default]
    None,
    /// Direct user input.
    User,
    /// Page script or content.
    Page,
    /// An action performed through automation.
    Action,
}

/// Kind of structural change reported to tree change observers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TreeChangeType {
    /// A single node was created.
    NodeCreated,
    /// The root of a new subtree was created.
    SubtreeCreated,
    /// A node's data changed.
    NodeChanged,
    /// A node's text changed.
    TextChanged,
    /// A node was removed.
    NodeRemoved,
    /// A batch of updates finished.
    SubtreeUpdateEnd,
}

/// Which tree changes an observer wants to hear about.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TreeChangeObserverFilter {
    /// Nothing; the registration is inert.
    NoTreeChanges,
    /// Changes inside live regions.
    LiveRegionTreeChanges,
    /// Changes on nodes carrying text markers (spelling, grammar, and so on).
    TextMarkerChanges,
    /// Everything.
    AllTreeChanges,
}

/// Host-defined action offered by a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomAction {
    /// Id passed back when performing the action.
    pub id: i32,
    /// Human-readable description.
    pub description: String,
}

/// One end of a text selection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SelectionEndpoint {
    /// Node holding the endpoint; `-1` or `0` when unset.
    pub node_id: NodeId,
    /// Offset within the node.
    pub offset: i32,
    /// Affinity at the offset.
    pub affinity: TextAffinity,
}

/// Text selection of a whole tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TreeSelection {
    /// Where the selection started.
    pub anchor: SelectionEndpoint,
    /// Where the selection ends (the caret).
    pub focus: SelectionEndpoint,
    /// Whether focus precedes anchor in document order.
    pub is_backward: bool,
}

impl SelectionEndpoint {
    /// The endpoint's node, if it has one.
    pub fn node(&self) -> Option<NodeId> {
        (self.node_id.is_valid() && self.node_id.0 != -1).then_some(self.node_id)
    }
}
