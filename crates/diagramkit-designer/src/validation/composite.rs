use crate::model::{
    ConnectionPoint, Connector, ConnectorKind, Entity, Shape, ShapeKind, ShapeLookup,
};

use super::{rules, ValidationBuilder, ValidationContext, ValidationResult};

/// Id, position and non-zero dimensions, plus style checks for whichever
/// optional fields are set, kind-specific geometry, and any validator
/// registered for the shape's type.
pub fn shape_rule(shape: &Shape, context: ValidationContext<'_>) -> ValidationResult {
    let style = &shape.style;
    ValidationBuilder::new(shape)
        .with_context(context)
        .rule(|s, _| rules::id(s.id()))
        .rule(|s, _| rules::position("position", &s.position))
        .rule(|s, _| rules::dimensions(&s.dimensions, false))
        .rule_if(style.fill_color.is_some(), |s, _| {
            optional_color("fillColor", s.style.fill_color.as_deref())
        })
        .rule_if(style.stroke_color.is_some(), |s, _| {
            optional_color("strokeColor", s.style.stroke_color.as_deref())
        })
        .rule_if(style.text_color.is_some(), |s, _| {
            optional_color("textColor", s.style.text_color.as_deref())
        })
        .rule_if(style.stroke_width.is_some(), |s, _| {
            s.style
                .stroke_width
                .map(|w| rules::stroke_width("strokeWidth", w))
                .unwrap_or_default()
        })
        .rule(|s, _| text_layout(s))
        .rule(|s, _| shape_kind(&s.kind))
        .rule(|s, ctx| {
            ctx.validators
                .and_then(|registry| registry.resolve(s.shape_type(), s.sub_type()))
                .map(|validator| validator(s))
                .unwrap_or_default()
        })
        .execute()
}

/// Id, both connection points, optional style, kind data and, when the
/// context carries a shape map, existence of both endpoint shapes.
pub fn connector_rule(connector: &Connector, context: ValidationContext<'_>) -> ValidationResult {
    ValidationBuilder::new(connector)
        .with_context(context)
        .rule(|c, _| rules::id(c.id()))
        .rule(|c, _| connection_point("source", &c.source))
        .rule(|c, _| connection_point("target", &c.target))
        .rule_if(connector.stroke_color.is_some(), |c, _| {
            optional_color("strokeColor", c.stroke_color.as_deref())
        })
        .rule_if(connector.stroke_width.is_some(), |c, _| {
            c.stroke_width
                .map(|w| rules::stroke_width("strokeWidth", w))
                .unwrap_or_default()
        })
        .rule(|c, _| connector_kind(&c.kind))
        .rule_if(context.shapes.is_some(), |c, ctx| {
            let Some(shapes) = ctx.shapes else {
                return ValidationResult::valid();
            };
            [("source", &c.source), ("target", &c.target)]
                .into_iter()
                .filter(|(_, point)| !point.shape_id.trim().is_empty())
                .map(|(end, point)| {
                    ValidationResult::check(shapes.shape(&point.shape_id).is_some(), || {
                        format!("{end} shape '{}' does not exist", point.shape_id)
                    })
                })
                .collect()
        })
        .execute()
}

pub fn validate_entity(entity: &Entity, context: ValidationContext<'_>) -> ValidationResult {
    match entity {
        Entity::Shape(shape) => shape_rule(shape, context),
        Entity::Connector(connector) => connector_rule(connector, context),
    }
}

fn optional_color(field: &str, value: Option<&str>) -> ValidationResult {
    value
        .map(|v| rules::color(field, v))
        .unwrap_or_default()
}

fn connection_point(end: &str, point: &ConnectionPoint) -> ValidationResult {
    [
        rules::non_empty(&format!("{end}.shapeId"), &point.shape_id),
        rules::anchor_token(&format!("{end}.anchor"), point.anchor.as_str()),
    ]
    .into_iter()
    .collect()
}

fn text_layout(shape: &Shape) -> ValidationResult {
    let text = &shape.text;
    let mut result = ValidationResult::check(
        text.line_height.is_finite() && text.line_height > 0.0,
        || format!("lineHeight must be greater than 0, got {}", text.line_height),
    );
    if text.max_lines == Some(0) {
        result.merge(ValidationResult::invalid("maxLines must be at least 1"));
    }
    result
}

fn shape_kind(kind: &ShapeKind) -> ValidationResult {
    match kind {
        ShapeKind::Task { corner_radius } => rules::non_negative("cornerRadius", *corner_radius),
        ShapeKind::Pool { header_width } => rules::non_negative("headerWidth", *header_width),
        ShapeKind::Custom { type_name, .. } => rules::non_empty("typeName", type_name),
        ShapeKind::Rectangle | ShapeKind::Event { .. } | ShapeKind::Gateway { .. } => {
            ValidationResult::valid()
        }
    }
}

fn connector_kind(kind: &ConnectorKind) -> ValidationResult {
    match kind {
        ConnectorKind::Straight => ValidationResult::valid(),
        ConnectorKind::Orthogonal { waypoints } => waypoints
            .iter()
            .enumerate()
            .map(|(i, p)| rules::position(&format!("waypoints[{i}]"), p))
            .collect(),
        ConnectorKind::Curved { curvature } => rules::non_negative("curvature", *curvature),
    }
}
