//! Roving TabIndex - one tab stop per composite widget.
//!
//! A roving focus group manages a single logical focus position across
//! a set of sibling items (a menu, listbox, tab strip, ...): exactly
//! one member carries tab index 0 and sits in the sequential Tab order;
//! every other member gets tab index -1, still reachable by arrow keys
//! but skipped by Tab. Keyboard users land on the group in one Tab
//! press, then move within it via arrows.
//!
//! Members are discovered by role marker on the container's
//! descendants, and the member list is recomputed as a whole snapshot
//! on every structural change - never patched in place, so index drift
//! cannot produce transient inconsistent states. A current index left
//! stale by recomputation is re-clamped into range, never propagated as
//! a fault.

use std::cell::RefCell;
use std::rc::Rc;

use super::{focus, keyboard};
use crate::engine::tree;
use crate::types::{NodeFlags, Orientation, TextDirection};

// =============================================================================
// Options
// =============================================================================

/// Roles that mark a descendant as a group member when no explicit
/// `item_role` is configured.
pub const ITEM_ROLES: [&str; 8] = [
    "menuitem",
    "menuitemcheckbox",
    "menuitemradio",
    "option",
    "tab",
    "radio",
    "treeitem",
    "gridcell",
];

/// Roving focus group configuration.
#[derive(Debug, Clone)]
pub struct RovingOptions {
    /// Which arrow keys navigate (default vertical).
    pub orientation: Orientation,
    /// Wrap past the ends instead of clamping (default true).
    pub loop_focus: bool,
    /// Right-to-left inverts Left/Right semantics.
    pub direction: TextDirection,
    /// Explicit member role marker; `None` accepts any standard
    /// composite-item role.
    pub item_role: Option<String>,
    /// Carried on every focus move this group performs.
    pub prevent_scroll: bool,
}

impl Default for RovingOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            loop_focus: true,
            direction: TextDirection::Ltr,
            item_role: None,
            prevent_scroll: false,
        }
    }
}

// =============================================================================
// Group
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NavAction {
    Next,
    Previous,
    First,
    Last,
}

struct GroupState {
    container: usize,
    options: RovingOptions,
    /// The immutable member snapshot for the current generation.
    members: Vec<usize>,
    /// Index into `members` of the current tab stop.
    current: usize,
    attached: bool,
}

/// An attached roving focus group.
///
/// Created by [`RovingFocusGroup::attach`]; torn down by
/// [`detach`](RovingFocusGroup::detach) or drop, which removes exactly
/// the listeners the attachment added and clears member tab stops.
pub struct RovingFocusGroup {
    state: Rc<RefCell<GroupState>>,
    key_cleanup: Option<Box<dyn FnOnce()>>,
    structure_cleanup: Option<Box<dyn FnOnce()>>,
}

impl RovingFocusGroup {
    /// Attach a group to a container.
    ///
    /// Discovers members among the container's descendants by role
    /// marker, makes the first member the tab stop, and installs the
    /// arrow-key handler plus the structural-change subscription that
    /// keeps the member snapshot fresh.
    pub fn attach(container: usize, options: RovingOptions) -> Self {
        let members = discover_members(container, &options);
        let state = Rc::new(RefCell::new(GroupState {
            container,
            options,
            members,
            current: 0,
            attached: true,
        }));
        apply_tab_stops(&state);

        let key_state = state.clone();
        let key_cleanup = keyboard::on_capture(move |event| handle_key(&key_state, event));

        let structure_state = state.clone();
        let structure_cleanup = tree::on_structural_change(move || recompute(&structure_state));

        Self {
            state,
            key_cleanup: Some(Box::new(key_cleanup)),
            structure_cleanup: Some(Box::new(structure_cleanup)),
        }
    }

    /// The container this group was attached to.
    pub fn container(&self) -> usize {
        self.state.borrow().container
    }

    /// The current member snapshot, in document order.
    pub fn members(&self) -> Vec<usize> {
        self.state.borrow().members.clone()
    }

    /// The logical focus position, or `None` for an empty group.
    pub fn current_index(&self) -> Option<usize> {
        let state = self.state.borrow();
        if state.members.is_empty() {
            None
        } else {
            Some(state.current)
        }
    }

    /// The node currently acting as the group's tab stop.
    pub fn current_member(&self) -> Option<usize> {
        let state = self.state.borrow();
        state.members.get(state.current).copied()
    }

    /// Move to the next member (same state transition as the
    /// corresponding arrow key).
    pub fn focus_next(&self) -> bool {
        navigate(&self.state, NavAction::Next)
    }

    /// Move to the previous member.
    pub fn focus_previous(&self) -> bool {
        navigate(&self.state, NavAction::Previous)
    }

    /// Jump to the first member.
    pub fn focus_first(&self) -> bool {
        navigate(&self.state, NavAction::First)
    }

    /// Jump to the last member.
    pub fn focus_last(&self) -> bool {
        navigate(&self.state, NavAction::Last)
    }

    /// Recompute the member snapshot now (also happens automatically on
    /// structural changes).
    pub fn refresh(&self) {
        recompute(&self.state);
    }

    /// Detach the group: remove its listeners and clear member tab
    /// stops.
    pub fn detach(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(cleanup) = self.key_cleanup.take() {
            cleanup();
        }
        if let Some(cleanup) = self.structure_cleanup.take() {
            cleanup();
        }
        let members = {
            let mut state = self.state.borrow_mut();
            if !state.attached {
                return;
            }
            state.attached = false;
            std::mem::take(&mut state.members)
        };
        for member in members {
            tree::set_tab_index(member, None);
        }
    }
}

impl Drop for RovingFocusGroup {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// Member Discovery
// =============================================================================

fn discover_members(container: usize, options: &RovingOptions) -> Vec<usize> {
    tree::descendants_of(container)
        .into_iter()
        .filter(|&index| {
            let Some(role) = tree::role_of(index) else {
                return false;
            };
            let role_matches = match &options.item_role {
                Some(wanted) => role == *wanted,
                None => ITEM_ROLES.contains(&role.as_str()),
            };
            role_matches
                && tree::is_visible(index)
                && !tree::flags_of(index).contains(NodeFlags::DISABLED)
        })
        .collect()
}

/// Re-snapshot the member list after a structural change.
///
/// The whole list is recomputed atomically; a current index past the
/// end of the new list is clamped back into range.
fn recompute(state: &Rc<RefCell<GroupState>>) {
    let (container, options, old_members, old_current, attached) = {
        let state = state.borrow();
        (
            state.container,
            state.options.clone(),
            state.members.clone(),
            state.current,
            state.attached,
        )
    };
    if !attached {
        return;
    }

    let members = discover_members(container, &options);
    if members == old_members {
        return;
    }

    let current = if members.is_empty() {
        0
    } else {
        old_current.min(members.len() - 1)
    };

    {
        let mut state = state.borrow_mut();
        state.members = members;
        state.current = current;
    }
    apply_tab_stops(state);
}

/// Write the tab stops: exactly one member at 0, all others at -1.
fn apply_tab_stops(state: &Rc<RefCell<GroupState>>) {
    let (members, current) = {
        let state = state.borrow();
        (state.members.clone(), state.current)
    };
    for (position, member) in members.iter().enumerate() {
        tree::set_tab_index(*member, Some(if position == current { 0 } else { -1 }));
    }
}

// =============================================================================
// Navigation
// =============================================================================

fn handle_key(state: &Rc<RefCell<GroupState>>, event: &keyboard::KeyboardEvent) -> bool {
    let (attached, orientation, rtl) = {
        let state = state.borrow();
        (
            state.attached,
            state.options.orientation,
            state.options.direction.is_rtl(),
        )
    };
    if !attached {
        return false;
    }

    // Only navigate while focus sits on one of our members.
    let Some(focused) = focus::focused() else {
        return false;
    };
    let is_member = state.borrow().members.contains(&focused);
    if !is_member {
        return false;
    }

    let vertical = matches!(orientation, Orientation::Vertical | Orientation::Both);
    let horizontal = matches!(orientation, Orientation::Horizontal | Orientation::Both);

    let action = match event.key.as_str() {
        "ArrowUp" if vertical => NavAction::Previous,
        "ArrowDown" if vertical => NavAction::Next,
        "ArrowLeft" if horizontal => {
            if rtl {
                NavAction::Next
            } else {
                NavAction::Previous
            }
        }
        "ArrowRight" if horizontal => {
            if rtl {
                NavAction::Previous
            } else {
                NavAction::Next
            }
        }
        "Home" => NavAction::First,
        "End" => NavAction::Last,
        _ => return false,
    };

    navigate(state, action);
    true
}

/// Perform one navigation step. Key events and the exposed navigation
/// primitives share this path, so both produce identical state.
fn navigate(state: &Rc<RefCell<GroupState>>, action: NavAction) -> bool {
    let (member, prevent_scroll) = {
        let mut state = state.borrow_mut();
        if !state.attached || state.members.is_empty() {
            return false;
        }

        // Re-anchor to the actually focused member first; pointer
        // interaction may have moved focus without going through us.
        if let Some(focused) = focus::focused() {
            if let Some(position) = state.members.iter().position(|&m| m == focused) {
                state.current = position;
            }
        }

        let last = state.members.len() - 1;
        let target = match action {
            NavAction::First => 0,
            NavAction::Last => last,
            NavAction::Next => {
                if state.current < last {
                    state.current + 1
                } else if state.options.loop_focus {
                    0
                } else {
                    state.current
                }
            }
            NavAction::Previous => {
                if state.current > 0 {
                    state.current - 1
                } else if state.options.loop_focus {
                    last
                } else {
                    0
                }
            }
        };

        state.current = target;
        (state.members[target], state.options.prevent_scroll)
    };

    apply_tab_stops(state);
    focus::focus_with_options(member, prevent_scroll);
    true
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::view::{ViewElement, ViewNode};
    use crate::state::keyboard::{route_key_event, KeyboardEvent};

    fn setup() {
        tree::reset_tree();
        focus::reset_focus_state();
        keyboard::reset_keyboard_state();
    }

    fn item(role: &str) -> ViewNode {
        let mut element = ViewElement::new("Button");
        element.flags = NodeFlags::FOCUSABLE;
        element.role = Some(role.to_string());
        ViewNode::Element(element)
    }

    /// Mount a container with `count` menuitem members plus one plain
    /// child that must not be discovered.
    fn mount_menu(count: usize) -> (usize, Vec<usize>) {
        let root = tree::mount(ViewNode::Element(ViewElement::new("Box")));
        let container =
            tree::append_child(root, ViewNode::Element(ViewElement::new("Box"))).unwrap();
        let members: Vec<usize> = (0..count)
            .map(|_| tree::append_child(container, item("menuitem")).unwrap())
            .collect();
        tree::append_child(container, ViewNode::Element(ViewElement::new("Text"))).unwrap();
        (container, members)
    }

    #[test]
    fn test_discovery_by_role() {
        setup();
        let (container, members) = mount_menu(3);

        let group = RovingFocusGroup::attach(container, RovingOptions::default());
        assert_eq!(group.members(), members);
        assert_eq!(group.current_index(), Some(0));
    }

    #[test]
    fn test_exactly_one_tab_stop() {
        setup();
        let (container, members) = mount_menu(3);

        let group = RovingFocusGroup::attach(container, RovingOptions::default());
        assert_eq!(tree::tab_index_of(members[0]), Some(0));
        assert_eq!(tree::tab_index_of(members[1]), Some(-1));
        assert_eq!(tree::tab_index_of(members[2]), Some(-1));

        group.focus_next();
        assert_eq!(tree::tab_index_of(members[0]), Some(-1));
        assert_eq!(tree::tab_index_of(members[1]), Some(0));
        assert_eq!(tree::tab_index_of(members[2]), Some(-1));

        // Only the current member sits in the sequential tab order.
        assert_eq!(tree::tab_order(), vec![members[1]]);
    }

    #[test]
    fn test_arrow_down_wraps_with_loop() {
        setup();
        let (container, members) = mount_menu(3);

        let group = RovingFocusGroup::attach(container, RovingOptions::default());
        group.focus_last();
        assert_eq!(group.current_index(), Some(2));

        assert!(route_key_event(KeyboardEvent::new("ArrowDown")));
        assert_eq!(group.current_index(), Some(0));
        assert!(focus::is_focused(members[0]));
    }

    #[test]
    fn test_arrow_down_clamps_without_loop() {
        setup();
        let (container, members) = mount_menu(3);

        let group = RovingFocusGroup::attach(
            container,
            RovingOptions {
                loop_focus: false,
                ..Default::default()
            },
        );
        group.focus_last();

        route_key_event(KeyboardEvent::new("ArrowDown"));
        assert_eq!(group.current_index(), Some(2));
        assert!(focus::is_focused(members[2]));
    }

    #[test]
    fn test_rtl_inverts_horizontal() {
        setup();
        let (container, members) = mount_menu(3);

        let group = RovingFocusGroup::attach(
            container,
            RovingOptions {
                orientation: Orientation::Horizontal,
                direction: TextDirection::Rtl,
                ..Default::default()
            },
        );
        focus::focus(members[0]);

        // ArrowRight behaves as ArrowLeft would in left-to-right mode:
        // from index 0 it wraps back to the last member.
        assert!(route_key_event(KeyboardEvent::new("ArrowRight")));
        assert_eq!(group.current_index(), Some(2));

        assert!(route_key_event(KeyboardEvent::new("ArrowLeft")));
        assert_eq!(group.current_index(), Some(0));
    }

    #[test]
    fn test_orientation_filters_keys() {
        setup();
        let (container, members) = mount_menu(3);

        let group = RovingFocusGroup::attach(
            container,
            RovingOptions {
                orientation: Orientation::Horizontal,
                ..Default::default()
            },
        );
        focus::focus(members[0]);

        // Vertical arrows are not ours in a horizontal group.
        assert!(!route_key_event(KeyboardEvent::new("ArrowDown")));
        assert_eq!(group.current_index(), Some(0));

        assert!(route_key_event(KeyboardEvent::new("ArrowRight")));
        assert_eq!(group.current_index(), Some(1));
    }

    #[test]
    fn test_both_orientation_accepts_all_arrows() {
        setup();
        let (container, members) = mount_menu(3);

        let group = RovingFocusGroup::attach(
            container,
            RovingOptions {
                orientation: Orientation::Both,
                ..Default::default()
            },
        );
        focus::focus(members[0]);

        route_key_event(KeyboardEvent::new("ArrowDown"));
        assert_eq!(group.current_index(), Some(1));
        route_key_event(KeyboardEvent::new("ArrowRight"));
        assert_eq!(group.current_index(), Some(2));
        route_key_event(KeyboardEvent::new("ArrowUp"));
        assert_eq!(group.current_index(), Some(1));
        route_key_event(KeyboardEvent::new("ArrowLeft"));
        assert_eq!(group.current_index(), Some(0));
    }

    #[test]
    fn test_home_end_unconditional() {
        setup();
        let (container, members) = mount_menu(4);

        let group = RovingFocusGroup::attach(
            container,
            RovingOptions {
                loop_focus: false,
                ..Default::default()
            },
        );
        group.focus_next();
        assert_eq!(group.current_index(), Some(1));

        focus::focus(members[1]);
        assert!(route_key_event(KeyboardEvent::new("End")));
        assert_eq!(group.current_index(), Some(3));
        assert!(focus::is_focused(members[3]));

        assert!(route_key_event(KeyboardEvent::new("Home")));
        assert_eq!(group.current_index(), Some(0));
        assert!(focus::is_focused(members[0]));
    }

    #[test]
    fn test_keys_ignored_when_focus_outside_group() {
        setup();
        let (container, _) = mount_menu(3);
        let outside = {
            let root = tree::mount(ViewNode::Element(ViewElement::new("Box")));
            let mut button = ViewElement::new("Button");
            button.flags = NodeFlags::FOCUSABLE;
            tree::append_child(root, ViewNode::Element(button)).unwrap()
        };

        let group = RovingFocusGroup::attach(container, RovingOptions::default());
        focus::focus(outside);

        assert!(!route_key_event(KeyboardEvent::new("ArrowDown")));
        assert_eq!(group.current_index(), Some(0));
        assert!(focus::is_focused(outside));
    }

    #[test]
    fn test_primitives_match_key_navigation() {
        setup();
        let (container, members) = mount_menu(3);

        let group = RovingFocusGroup::attach(container, RovingOptions::default());

        group.focus_next();
        assert_eq!(group.current_index(), Some(1));
        assert!(focus::is_focused(members[1]));

        // The equivalent key event continues from the same state.
        route_key_event(KeyboardEvent::new("ArrowDown"));
        assert_eq!(group.current_index(), Some(2));

        group.focus_previous();
        assert_eq!(group.current_index(), Some(1));
        group.focus_first();
        assert_eq!(group.current_index(), Some(0));
        group.focus_last();
        assert_eq!(group.current_index(), Some(2));
    }

    #[test]
    fn test_structural_change_recomputes_snapshot() {
        setup();
        let (container, members) = mount_menu(2);

        let group = RovingFocusGroup::attach(container, RovingOptions::default());
        assert_eq!(group.members().len(), 2);

        // Insertion is picked up without an explicit refresh.
        let added = tree::append_child(container, item("menuitem")).unwrap();
        assert_eq!(group.members(), vec![members[0], members[1], added]);

        // The new member joins with the roving -1 tab index.
        assert_eq!(tree::tab_index_of(added), Some(-1));
    }

    #[test]
    fn test_stale_current_index_clamped() {
        setup();
        let (container, members) = mount_menu(3);

        let group = RovingFocusGroup::attach(container, RovingOptions::default());
        group.focus_last();
        assert_eq!(group.current_index(), Some(2));

        tree::remove_node(members[2]);
        // The previous index points past the new snapshot; it clamps.
        assert_eq!(group.members().len(), 2);
        assert_eq!(group.current_index(), Some(1));
        assert_eq!(tree::tab_index_of(members[1]), Some(0));
    }

    #[test]
    fn test_empty_group_is_inert() {
        setup();
        let root = tree::mount(ViewNode::Element(ViewElement::new("Box")));
        let container =
            tree::append_child(root, ViewNode::Element(ViewElement::new("Box"))).unwrap();

        let group = RovingFocusGroup::attach(container, RovingOptions::default());
        assert_eq!(group.current_index(), None);
        assert!(!group.focus_next());
        assert!(!group.focus_first());
    }

    #[test]
    fn test_detach_clears_tab_stops_and_listeners() {
        setup();
        let (container, members) = mount_menu(2);

        let group = RovingFocusGroup::attach(container, RovingOptions::default());
        assert_eq!(tree::tab_index_of(members[0]), Some(0));

        focus::focus(members[0]);
        group.detach();

        assert_eq!(tree::tab_index_of(members[0]), None);
        assert_eq!(tree::tab_index_of(members[1]), None);
        // The key listener is gone with the group.
        assert!(!route_key_event(KeyboardEvent::new("ArrowDown")));
    }

    #[test]
    fn test_disabled_and_hidden_items_not_members() {
        setup();
        let (container, members) = mount_menu(2);

        let mut disabled = ViewElement::new("Button");
        disabled.flags = NodeFlags::FOCUSABLE | NodeFlags::DISABLED;
        disabled.role = Some("menuitem".to_string());
        tree::append_child(container, ViewNode::Element(disabled)).unwrap();

        let mut hidden = ViewElement::new("Button");
        hidden.flags = NodeFlags::FOCUSABLE | NodeFlags::HIDDEN;
        hidden.role = Some("menuitem".to_string());
        tree::append_child(container, ViewNode::Element(hidden)).unwrap();

        let group = RovingFocusGroup::attach(container, RovingOptions::default());
        assert_eq!(group.members(), members);
    }
}
