//! Board items: the drawable kinds and their wire encoding.

mod circle;
mod pen;
mod rectangle;
mod segment;
mod text;

pub use circle::Circle;
pub use pen::Pen;
pub use rectangle::Rectangle;
pub use segment::Segment;
pub use text::Text;

use kurbo::{BezPath, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for items. Generated by the client that creates the item.
pub type ItemId = Uuid;

/// Stroke width used when the wire omits one.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;
/// Font size used when the wire omits one.
pub const DEFAULT_FONT_SIZE: f64 = 20.0;

/// Errors raised while validating a wire item.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("{kind:?} item is missing `{field}`")]
    MissingField { kind: ItemKind, field: &'static str },
}

/// Result type for item decoding.
pub type ItemResult<T> = Result<T, ItemError>;

/// RGBA color with a hex string wire form (`#rrggbb` or `#rrggbbaa`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Board background, also the ink of the standard eraser.
    pub const fn background() -> Self {
        Self::new(0x12, 0x12, 0x12, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let r = byte(&hex[0..1])? * 17;
                let g = byte(&hex[1..2])? * 17;
                let b = byte(&hex[2..3])? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                byte(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Hex form; the alpha pair is only written when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::white()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

impl Serialize for SerializableColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SerializableColor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Anything that is not a parseable hex string reads as white
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value.as_str().and_then(Self::from_hex).unwrap_or_default())
    }
}

/// Stroke properties shared by every kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemStyle {
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
}

impl ItemStyle {
    pub fn new(stroke_color: SerializableColor, stroke_width: f64) -> Self {
        Self {
            stroke_color,
            stroke_width,
        }
    }
}

impl Default for ItemStyle {
    fn default() -> Self {
        Self::new(SerializableColor::white(), DEFAULT_STROKE_WIDTH)
    }
}

/// The wire discriminant of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    Pen,
    Rectangle,
    Circle,
    Line,
    Arrow,
    Text,
}

/// Common behavior of every drawable kind.
pub trait ItemTrait {
    /// Get the unique identifier.
    fn id(&self) -> ItemId;

    /// Bounding box of the geometry in world coordinates, stroke excluded.
    fn bounds(&self) -> Rect;

    /// Check if a world point hits this item within `tolerance` world units.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Outline path for rendering.
    fn to_path(&self) -> BezPath;

    fn style(&self) -> &ItemStyle;
}

/// A drawable element on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireItem", into = "WireItem")]
pub enum Item {
    Pen(Pen),
    Rectangle(Rectangle),
    Circle(Circle),
    Line(Segment),
    Arrow(Segment),
    Text(Text),
}

impl Item {
    /// Build a two-point item of `kind` with a fresh id.
    ///
    /// Returns `None` for kinds that are not defined by two corners.
    pub fn two_point(kind: ItemKind, start: Point, end: Point, style: ItemStyle) -> Option<Self> {
        let item = match kind {
            ItemKind::Rectangle => Item::Rectangle(Rectangle::new(start, end, style)),
            ItemKind::Circle => Item::Circle(Circle::new(start, end, style)),
            ItemKind::Line => Item::Line(Segment::new(start, end, style)),
            ItemKind::Arrow => Item::Arrow(Segment::new(start, end, style)),
            ItemKind::Pen | ItemKind::Text => return None,
        };
        Some(item)
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Pen(_) => ItemKind::Pen,
            Item::Rectangle(_) => ItemKind::Rectangle,
            Item::Circle(_) => ItemKind::Circle,
            Item::Line(_) => ItemKind::Line,
            Item::Arrow(_) => ItemKind::Arrow,
            Item::Text(_) => ItemKind::Text,
        }
    }

    fn as_trait(&self) -> &dyn ItemTrait {
        match self {
            Item::Pen(i) => i,
            Item::Rectangle(i) => i,
            Item::Circle(i) => i,
            Item::Line(i) | Item::Arrow(i) => i,
            Item::Text(i) => i,
        }
    }

    pub fn id(&self) -> ItemId {
        self.as_trait().id()
    }

    pub fn bounds(&self) -> Rect {
        self.as_trait().bounds()
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_trait().hit_test(point, tolerance)
    }

    pub fn to_path(&self) -> BezPath {
        self.as_trait().to_path()
    }

    pub fn style(&self) -> &ItemStyle {
        self.as_trait().style()
    }

    /// False for items with nothing to draw or hit (empty strokes, blank text).
    pub fn has_geometry(&self) -> bool {
        match self {
            Item::Pen(p) => !p.points.is_empty(),
            Item::Text(t) => !t.text.is_empty(),
            _ => true,
        }
    }

    /// Move the free end of a drafted item to `point`.
    ///
    /// Strokes grow by one point; two-point kinds move their end corner.
    /// Text has no draggable end.
    pub fn extend_to(&mut self, point: Point) {
        match self {
            Item::Pen(p) => p.points.push(point),
            Item::Rectangle(r) => r.end = point,
            Item::Circle(c) => c.end = point,
            Item::Line(s) | Item::Arrow(s) => s.end = point,
            Item::Text(_) => {}
        }
    }
}

/// Flat camelCase object exchanged with the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireItem {
    id: ItemId,
    #[serde(rename = "type")]
    kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stroke_color: Option<SerializableColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    points: Option<Vec<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_size: Option<f64>,
}

impl WireItem {
    fn empty(id: ItemId, kind: ItemKind, style: ItemStyle) -> Self {
        Self {
            id,
            kind,
            stroke_color: Some(style.stroke_color),
            stroke_width: Some(style.stroke_width),
            points: None,
            start_x: None,
            start_y: None,
            end_x: None,
            end_y: None,
            text: None,
            font_size: None,
        }
    }

    fn require(&self, value: Option<f64>, field: &'static str) -> ItemResult<f64> {
        value.ok_or(ItemError::MissingField {
            kind: self.kind,
            field,
        })
    }

    fn start(&self) -> ItemResult<Point> {
        Ok(Point::new(
            self.require(self.start_x, "startX")?,
            self.require(self.start_y, "startY")?,
        ))
    }

    fn end(&self) -> ItemResult<Point> {
        Ok(Point::new(
            self.require(self.end_x, "endX")?,
            self.require(self.end_y, "endY")?,
        ))
    }
}

impl TryFrom<WireItem> for Item {
    type Error = ItemError;

    fn try_from(wire: WireItem) -> ItemResult<Self> {
        let style = ItemStyle::new(
            wire.stroke_color.unwrap_or_default(),
            wire.stroke_width.unwrap_or(DEFAULT_STROKE_WIDTH),
        );
        let id = wire.id;
        let item = match wire.kind {
            ItemKind::Pen => {
                let points = wire.points.ok_or(ItemError::MissingField {
                    kind: ItemKind::Pen,
                    field: "points",
                })?;
                Item::Pen(Pen::reconstruct(id, points, style))
            }
            ItemKind::Text => {
                let position = wire.start()?;
                Item::Text(Text::reconstruct(
                    id,
                    position,
                    wire.text.unwrap_or_default(),
                    wire.font_size.unwrap_or(DEFAULT_FONT_SIZE),
                    style,
                ))
            }
            kind => {
                let (start, end) = (wire.start()?, wire.end()?);
                match kind {
                    ItemKind::Rectangle => Item::Rectangle(Rectangle::reconstruct(id, start, end, style)),
                    ItemKind::Circle => Item::Circle(Circle::reconstruct(id, start, end, style)),
                    ItemKind::Arrow => Item::Arrow(Segment::reconstruct(id, start, end, style)),
                    _ => Item::Line(Segment::reconstruct(id, start, end, style)),
                }
            }
        };
        Ok(item)
    }
}

impl From<Item> for WireItem {
    fn from(item: Item) -> Self {
        let mut wire = WireItem::empty(item.id(), item.kind(), *item.style());
        let corners = |wire: &mut WireItem, start: Point, end: Point| {
            wire.start_x = Some(start.x);
            wire.start_y = Some(start.y);
            wire.end_x = Some(end.x);
            wire.end_y = Some(end.y);
        };
        match item {
            Item::Pen(p) => wire.points = Some(p.points),
            Item::Rectangle(r) => corners(&mut wire, r.start, r.end),
            Item::Circle(c) => corners(&mut wire, c.start, c.end),
            Item::Line(s) | Item::Arrow(s) => corners(&mut wire, s.start, s.end),
            Item::Text(t) => {
                wire.start_x = Some(t.position.x);
                wire.start_y = Some(t.position.y);
                wire.text = Some(t.text);
                wire.font_size = Some(t.font_size);
            }
        }
        wire
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_color_hex_forms() {
        assert_eq!(
            SerializableColor::from_hex("#fff"),
            Some(SerializableColor::white())
        );
        assert_eq!(
            SerializableColor::from_hex("#121212"),
            Some(SerializableColor::background())
        );
        assert_eq!(
            SerializableColor::from_hex("#ff000080"),
            Some(SerializableColor::new(255, 0, 0, 128))
        );
        assert_eq!(SerializableColor::from_hex("red"), None);
        assert_eq!(SerializableColor::from_hex("#12345"), None);
        assert_eq!(SerializableColor::new(255, 0, 0, 128).to_hex(), "#ff000080");
        assert_eq!(SerializableColor::background().to_hex(), "#121212");
    }

    #[test]
    fn test_color_peniko_conversion() {
        let color: Color = SerializableColor::new(10, 20, 30, 255).into();
        let back = SerializableColor::from(color);
        assert_eq!(back, SerializableColor::new(10, 20, 30, 255));
    }

    #[test]
    fn test_decode_pen_with_defaults() {
        let id = Uuid::new_v4();
        let item: Item = serde_json::from_value(json!({
            "id": id,
            "type": "PEN",
            "roomId": "lobby",
            "points": [{"x": 1.0, "y": 2.0}, {"x": 3.0, "y": 4.0}]
        }))
        .unwrap();
        assert_eq!(item.id(), id);
        assert_eq!(item.kind(), ItemKind::Pen);
        assert_eq!(item.style().stroke_color, SerializableColor::white());
        assert!((item.style().stroke_width - DEFAULT_STROKE_WIDTH).abs() < f64::EPSILON);
    }

    #[test]
    fn test_decode_bad_color_falls_back_to_white() {
        let item: Item = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "type": "LINE",
            "strokeColor": "not-a-color",
            "startX": 0, "startY": 0, "endX": 1, "endY": 1
        }))
        .unwrap();
        assert_eq!(item.style().stroke_color, SerializableColor::white());
    }

    #[test]
    fn test_decode_non_string_color_falls_back_to_white() {
        for color in [json!(16711680), json!({"r": 255}), json!([1, 2, 3])] {
            let item: Item = serde_json::from_value(json!({
                "id": Uuid::new_v4(),
                "type": "RECTANGLE",
                "strokeColor": color,
                "startX": 0, "startY": 0, "endX": 5, "endY": 5
            }))
            .unwrap();
            assert_eq!(item.style().stroke_color, SerializableColor::white());
        }
    }

    #[test]
    fn test_decode_text_defaults() {
        let item: Item = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "type": "TEXT",
            "startX": 5, "startY": 6
        }))
        .unwrap();
        let Item::Text(text) = item else {
            panic!("expected text");
        };
        assert_eq!(text.text, "");
        assert!((text.font_size - DEFAULT_FONT_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_decode_rejects_missing_geometry() {
        let missing_end = json!({
            "id": Uuid::new_v4(),
            "type": "RECTANGLE",
            "startX": 0, "startY": 0
        });
        assert!(serde_json::from_value::<Item>(missing_end).is_err());

        let missing_points = json!({"id": Uuid::new_v4(), "type": "PEN"});
        assert!(serde_json::from_value::<Item>(missing_points).is_err());
    }

    #[test]
    fn test_decode_rejects_unknown_kind_and_bad_id() {
        let unknown = json!({"id": Uuid::new_v4(), "type": "HEXAGON"});
        assert!(serde_json::from_value::<Item>(unknown).is_err());

        let bad_id = json!({"id": "abc", "type": "PEN", "points": []});
        assert!(serde_json::from_value::<Item>(bad_id).is_err());
    }

    #[test]
    fn test_encode_uses_flat_camel_case() {
        let style = ItemStyle::new(SerializableColor::new(255, 0, 0, 255), 4.0);
        let item = Item::two_point(
            ItemKind::Arrow,
            Point::new(1.0, 2.0),
            Point::new(3.0, 4.0),
            style,
        )
        .unwrap();
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "ARROW");
        assert_eq!(value["strokeColor"], "#ff0000");
        assert_eq!(value["strokeWidth"], 4.0);
        assert_eq!(value["startX"], 1.0);
        assert_eq!(value["endY"], 4.0);
        assert!(value.get("points").is_none());
    }

    #[test]
    fn test_two_point_rejects_pen_and_text() {
        let style = ItemStyle::default();
        assert!(Item::two_point(ItemKind::Pen, Point::ZERO, Point::ZERO, style).is_none());
        assert!(Item::two_point(ItemKind::Text, Point::ZERO, Point::ZERO, style).is_none());
    }

    #[test]
    fn test_extend_to() {
        let mut pen = Item::Pen(Pen::new(Point::ZERO, ItemStyle::default()));
        pen.extend_to(Point::new(1.0, 1.0));
        let Item::Pen(ref p) = pen else { unreachable!() };
        assert_eq!(p.points.len(), 2);

        let mut rect =
            Item::two_point(ItemKind::Rectangle, Point::ZERO, Point::ZERO, ItemStyle::default())
                .unwrap();
        rect.extend_to(Point::new(5.0, 5.0));
        assert_eq!(rect.bounds(), Rect::new(0.0, 0.0, 5.0, 5.0));
    }
}
