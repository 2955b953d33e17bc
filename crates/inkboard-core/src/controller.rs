//! Pointer-driven editing.
//!
//! The controller turns pointer events into drafts, camera moves and board
//! mutations. Finished mutations are applied to the local store right away
//! and handed back as [`Command`]s for the session to publish.

use crate::board::{BoardEvent, BoardStore};
use crate::camera::Camera;
use crate::input::{Modifiers, MouseButton, PointerEvent};
use crate::items::{Item, ItemId, ItemKind, ItemStyle, Pen, SerializableColor, Text};
use crate::tools::{OBJECT_ERASER_RADIUS_PX, ToolKind};
use kurbo::Point;

/// Outbound work produced by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A finished item, already applied locally. Publish once.
    Upsert(Item),
    /// An item removed locally. Publish once.
    Delete(ItemId),
    /// The board was emptied locally. Ask the relay to clear it.
    Clear,
    /// Ask the relay to drop its most recent item.
    Undo,
    /// Snapshot of a stroke being drawn. Publish subject to the stroke throttle.
    StrokeProgress(Item),
    /// Local pointer position in world coordinates. Subject to the cursor throttle.
    Cursor(Point),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Gesture {
    #[default]
    Idle,
    /// A draft is being shaped by the pointer.
    Drafting,
    /// Dragging the camera; `last` is the previous screen position.
    Panning { last: Point },
    /// Object eraser held down.
    Erasing,
}

/// Per-replica interaction state machine.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    tool: ToolKind,
    style: ItemStyle,
    modifiers: Modifiers,
    gesture: Gesture,
    draft: Option<Item>,
    /// World position of an open text entry.
    pending_text: Option<Point>,
    /// Button that started the current gesture.
    pressed: Option<MouseButton>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Switch tools. Any draft in progress is discarded.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool != self.tool {
            self.cancel();
            self.pending_text = None;
            self.tool = tool;
        }
    }

    pub fn style(&self) -> ItemStyle {
        self.style
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        self.style.stroke_color = color;
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.style.stroke_width = width.max(0.0);
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// The item being drawn, rendered as an overlay above the board.
    pub fn draft(&self) -> Option<&Item> {
        self.draft.as_ref()
    }

    /// Where an open text entry sits, if any.
    pub fn pending_text(&self) -> Option<Point> {
        self.pending_text
    }

    pub fn is_idle(&self) -> bool {
        self.gesture == Gesture::Idle
    }

    /// Feed one pointer event.
    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        camera: &mut Camera,
        store: &mut BoardStore,
    ) -> Vec<Command> {
        let mut out = Vec::new();
        match event {
            PointerEvent::Down { position, button } => {
                self.pointer_down(position, button, camera, store, &mut out);
            }
            PointerEvent::Move { position } => {
                let world = camera.screen_to_world(position);
                out.push(Command::Cursor(world));
                match self.gesture {
                    Gesture::Panning { last } => {
                        camera.pan(position - last);
                        self.gesture = Gesture::Panning { last: position };
                    }
                    Gesture::Drafting => {
                        if let Some(draft) = self.draft.as_mut() {
                            draft.extend_to(world);
                            // Shapes are only shared once finished
                            if draft.kind() == ItemKind::Pen {
                                out.push(Command::StrokeProgress(draft.clone()));
                            }
                        }
                    }
                    Gesture::Erasing => erase_at(world, camera, store, &mut out),
                    Gesture::Idle => {}
                }
            }
            PointerEvent::Up { button, .. } => {
                // Releasing some other button leaves the gesture running
                if self.pressed.is_none_or(|b| b == button) {
                    self.finish(store, &mut out);
                }
            }
            PointerEvent::Leave => self.finish(store, &mut out),
            PointerEvent::Scroll { position, delta } => camera.wheel_zoom(position, delta.y),
        }
        out
    }

    fn pointer_down(
        &mut self,
        position: Point,
        button: MouseButton,
        camera: &Camera,
        store: &mut BoardStore,
        out: &mut Vec<Command>,
    ) {
        if self.gesture != Gesture::Idle {
            return;
        }
        if button == MouseButton::Middle || self.tool == ToolKind::Pan || self.modifiers.space {
            self.gesture = Gesture::Panning { last: position };
            self.pressed = Some(button);
            return;
        }
        if button != MouseButton::Left {
            return;
        }

        let world = camera.screen_to_world(position);
        match self.tool {
            ToolKind::ObjectEraser => {
                self.gesture = Gesture::Erasing;
                self.pressed = Some(button);
                erase_at(world, camera, store, out);
            }
            ToolKind::Text => self.pending_text = Some(world),
            tool => {
                let style = tool.draft_style(self.style);
                self.draft = match tool.drafts() {
                    Some(ItemKind::Pen) => Some(Item::Pen(Pen::new(world, style))),
                    Some(kind) => Item::two_point(kind, world, world, style),
                    None => None,
                };
                if self.draft.is_some() {
                    self.gesture = Gesture::Drafting;
                    self.pressed = Some(button);
                }
            }
        }
    }

    /// End the current gesture, committing a draft if there is one.
    fn finish(&mut self, store: &mut BoardStore, out: &mut Vec<Command>) {
        if let Some(item) = self.draft.take() {
            store.apply(BoardEvent::Upsert(item.clone()));
            out.push(Command::Upsert(item));
        }
        self.gesture = Gesture::Idle;
        self.pressed = None;
    }

    /// Drop the current gesture without publishing anything.
    pub fn cancel(&mut self) {
        self.draft = None;
        self.gesture = Gesture::Idle;
        self.pressed = None;
    }

    /// Commit the open text entry. Blank text commits nothing.
    pub fn commit_text(&mut self, text: &str, store: &mut BoardStore) -> Option<Command> {
        let position = self.pending_text.take()?;
        if text.trim().is_empty() {
            return None;
        }
        let item = Item::Text(Text::new(position, text.to_string(), self.style));
        store.apply(BoardEvent::Upsert(item.clone()));
        Some(Command::Upsert(item))
    }

    pub fn cancel_text(&mut self) {
        self.pending_text = None;
    }

    /// Undo is decided by the relay; nothing changes locally until it answers.
    pub fn request_undo(&self) -> Command {
        Command::Undo
    }

    pub fn request_clear(&mut self, store: &mut BoardStore) -> Command {
        store.apply(BoardEvent::Clear);
        Command::Clear
    }
}

fn erase_at(world: Point, camera: &Camera, store: &mut BoardStore, out: &mut Vec<Command>) {
    let tolerance = camera.tolerance(OBJECT_ERASER_RADIUS_PX);
    if let Some(id) = store.topmost_at(world, tolerance) {
        store.apply(BoardEvent::Delete(id));
        out.push(Command::Delete(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Vec2;

    struct Rig {
        controller: InteractionController,
        camera: Camera,
        store: BoardStore,
    }

    impl Rig {
        fn new(tool: ToolKind) -> Self {
            let mut controller = InteractionController::new();
            controller.set_tool(tool);
            Self {
                controller,
                camera: Camera::new(),
                store: BoardStore::new(),
            }
        }

        fn send(&mut self, event: PointerEvent) -> Vec<Command> {
            self.controller
                .handle_pointer(event, &mut self.camera, &mut self.store)
        }

        fn down(&mut self, x: f64, y: f64) -> Vec<Command> {
            self.send(PointerEvent::Down {
                position: Point::new(x, y),
                button: MouseButton::Left,
            })
        }

        fn moved(&mut self, x: f64, y: f64) -> Vec<Command> {
            self.send(PointerEvent::Move {
                position: Point::new(x, y),
            })
        }

        fn up(&mut self, x: f64, y: f64) -> Vec<Command> {
            self.send(PointerEvent::Up {
                position: Point::new(x, y),
                button: MouseButton::Left,
            })
        }
    }

    fn upserts(commands: &[Command]) -> Vec<&Item> {
        commands
            .iter()
            .filter_map(|c| match c {
                Command::Upsert(item) => Some(item),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_pen_stroke_lifecycle() {
        let mut rig = Rig::new(ToolKind::Pen);
        assert!(rig.down(0.0, 0.0).is_empty());
        assert!(rig.store.is_empty());

        let cmds = rig.moved(5.0, 5.0);
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0], Command::Cursor(Point::new(5.0, 5.0)));
        assert!(matches!(&cmds[1], Command::StrokeProgress(Item::Pen(p)) if p.points.len() == 2));
        assert!(rig.store.is_empty());

        let cmds = rig.up(5.0, 5.0);
        let items = upserts(&cmds);
        assert_eq!(items.len(), 1);
        assert_eq!(rig.store.len(), 1);
        assert!(rig.controller.draft().is_none());
        assert!(rig.controller.is_idle());
    }

    #[test]
    fn test_shape_drafts_are_not_broadcast() {
        let mut rig = Rig::new(ToolKind::Rectangle);
        rig.down(10.0, 10.0);
        for i in 0..5 {
            let cmds = rig.moved(20.0 + i as f64, 30.0);
            assert!(cmds.iter().all(|c| matches!(c, Command::Cursor(_))));
        }
        let cmds = rig.up(24.0, 30.0);
        let items = upserts(&cmds);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind(), ItemKind::Rectangle);
        assert_eq!(items[0].bounds(), kurbo::Rect::new(10.0, 10.0, 24.0, 30.0));
    }

    #[test]
    fn test_pointer_leave_finalizes() {
        let mut rig = Rig::new(ToolKind::Line);
        rig.down(0.0, 0.0);
        rig.moved(10.0, 0.0);
        let cmds = rig.send(PointerEvent::Leave);
        assert_eq!(upserts(&cmds).len(), 1);
        assert_eq!(rig.store.len(), 1);
        // A later up has nothing left to commit
        assert!(rig.up(10.0, 0.0).is_empty());
    }

    #[test]
    fn test_cancel_discards_draft() {
        let mut rig = Rig::new(ToolKind::Pen);
        rig.down(0.0, 0.0);
        rig.moved(3.0, 3.0);
        rig.controller.cancel();
        assert!(rig.up(3.0, 3.0).is_empty());
        assert!(rig.store.is_empty());
    }

    #[test]
    fn test_eraser_paints_background() {
        let mut rig = Rig::new(ToolKind::Eraser);
        rig.controller
            .set_color(SerializableColor::new(255, 0, 0, 255));
        rig.down(0.0, 0.0);
        let cmds = rig.up(0.0, 0.0);
        let item = upserts(&cmds)[0];
        assert_eq!(item.kind(), ItemKind::Pen);
        assert_eq!(item.style().stroke_color, SerializableColor::background());
        assert!((item.style().stroke_width - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_drafts_use_world_coordinates() {
        let mut rig = Rig::new(ToolKind::Line);
        rig.camera.offset = Vec2::new(100.0, 0.0);
        rig.camera.zoom = 2.0;
        rig.down(100.0, 0.0);
        let cmds = rig.moved(120.0, 0.0);
        assert_eq!(cmds, vec![Command::Cursor(Point::new(10.0, 0.0))]);
        let cmds = rig.up(120.0, 0.0);
        let item = upserts(&cmds)[0];
        assert_eq!(item.bounds(), kurbo::Rect::new(0.0, 0.0, 10.0, 0.0));
    }

    #[test]
    fn test_object_eraser_deletes_topmost_hit() {
        let mut rig = Rig::new(ToolKind::Line);
        rig.down(0.0, 0.0);
        rig.moved(100.0, 0.0);
        let under = upserts(&rig.up(100.0, 0.0))[0].id();
        rig.down(0.0, 0.0);
        rig.moved(100.0, 0.0);
        let over = upserts(&rig.up(100.0, 0.0))[0].id();

        rig.controller.set_tool(ToolKind::ObjectEraser);
        let cmds = rig.down(50.0, 5.0);
        assert_eq!(cmds, vec![Command::Delete(over)]);
        assert!(rig.store.contains(under));
        assert!(!rig.store.contains(over));

        // Dragging keeps erasing
        let cmds = rig.moved(60.0, 0.0);
        assert!(cmds.contains(&Command::Delete(under)));
        assert!(rig.store.is_empty());
        rig.up(60.0, 0.0);
    }

    #[test]
    fn test_object_eraser_tolerance_is_screen_space() {
        let mut rig = Rig::new(ToolKind::Line);
        rig.down(0.0, 0.0);
        rig.moved(100.0, 0.0);
        rig.up(100.0, 0.0);

        rig.camera.zoom = 4.0;
        rig.controller.set_tool(ToolKind::ObjectEraser);
        let id = rig.store.iter().next().unwrap().id();
        // 8px on screen is 2 world units at 4x zoom
        assert_eq!(rig.down(200.0, 8.0), vec![Command::Delete(id)]);
        assert!(rig.store.is_empty());
    }

    #[test]
    fn test_object_eraser_miss() {
        let mut rig = Rig::new(ToolKind::ObjectEraser);
        assert!(rig.down(0.0, 0.0).is_empty());
    }

    #[test]
    fn test_pan_drag_and_wheel() {
        let mut rig = Rig::new(ToolKind::Pan);
        rig.down(10.0, 10.0);
        rig.moved(15.0, 30.0);
        rig.moved(20.0, 30.0);
        rig.up(20.0, 30.0);
        assert_eq!(rig.camera.offset, Vec2::new(10.0, 20.0));
        assert!(rig.store.is_empty());

        rig.send(PointerEvent::Scroll {
            position: Point::ZERO,
            delta: Vec2::new(0.0, -1.0),
        });
        assert!((rig.camera.zoom - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_middle_button_and_space_pan() {
        let mut rig = Rig::new(ToolKind::Pen);
        rig.send(PointerEvent::Down {
            position: Point::ZERO,
            button: MouseButton::Middle,
        });
        rig.moved(5.0, 0.0);
        rig.send(PointerEvent::Up {
            position: Point::new(5.0, 0.0),
            button: MouseButton::Middle,
        });
        assert_eq!(rig.camera.offset, Vec2::new(5.0, 0.0));

        rig.controller.set_modifiers(Modifiers {
            space: true,
            ..Modifiers::default()
        });
        rig.down(0.0, 0.0);
        rig.moved(0.0, 5.0);
        assert!(rig.up(0.0, 5.0).is_empty());
        assert_eq!(rig.camera.offset, Vec2::new(5.0, 5.0));
        assert!(rig.store.is_empty());
    }

    #[test]
    fn test_only_the_starting_button_finishes() {
        let mut rig = Rig::new(ToolKind::Rectangle);
        rig.down(0.0, 0.0);
        rig.moved(10.0, 10.0);
        let cmds = rig.send(PointerEvent::Up {
            position: Point::new(10.0, 10.0),
            button: MouseButton::Right,
        });
        assert!(upserts(&cmds).is_empty());
        assert!(rig.controller.draft().is_some());
        assert!(rig.store.is_empty());

        let cmds = rig.up(10.0, 10.0);
        assert_eq!(upserts(&cmds).len(), 1);
        assert!(rig.controller.is_idle());
        assert_eq!(rig.store.len(), 1);
    }

    #[test]
    fn test_right_button_does_nothing() {
        let mut rig = Rig::new(ToolKind::Pen);
        let cmds = rig.send(PointerEvent::Down {
            position: Point::ZERO,
            button: MouseButton::Right,
        });
        assert!(cmds.is_empty());
        assert!(rig.controller.draft().is_none());
    }

    #[test]
    fn test_text_commit() {
        let mut rig = Rig::new(ToolKind::Text);
        rig.down(30.0, 40.0);
        assert_eq!(rig.controller.pending_text(), Some(Point::new(30.0, 40.0)));
        let cmd = rig.controller.commit_text("hi", &mut rig.store);
        assert!(matches!(cmd, Some(Command::Upsert(Item::Text(ref t))) if t.text == "hi"));
        assert_eq!(rig.store.len(), 1);
        assert!(rig.controller.pending_text().is_none());
    }

    #[test]
    fn test_blank_text_is_not_committed() {
        let mut rig = Rig::new(ToolKind::Text);
        rig.down(0.0, 0.0);
        assert!(rig.controller.commit_text("   ", &mut rig.store).is_none());
        assert!(rig.store.is_empty());
        rig.down(0.0, 0.0);
        rig.controller.cancel_text();
        assert!(rig.controller.commit_text("late", &mut rig.store).is_none());
    }

    #[test]
    fn test_undo_and_clear() {
        let mut rig = Rig::new(ToolKind::Line);
        rig.down(0.0, 0.0);
        rig.up(10.0, 0.0);
        assert_eq!(rig.controller.request_undo(), Command::Undo);
        assert_eq!(rig.store.len(), 1);
        assert_eq!(rig.controller.request_clear(&mut rig.store), Command::Clear);
        assert!(rig.store.is_empty());
    }

    #[test]
    fn test_switching_tool_discards_draft() {
        let mut rig = Rig::new(ToolKind::Pen);
        rig.down(0.0, 0.0);
        rig.controller.set_tool(ToolKind::Circle);
        assert!(rig.controller.draft().is_none());
        assert!(rig.up(0.0, 0.0).is_empty());
    }
}
