use diagramkit_core::AnchorPosition;
use diagramkit_designer::document::{validate_document, DiagramDocument, DiagramType};
use diagramkit_designer::model::{ConnectorKind, EventType, ShapeKind, TextPlacement};
use diagramkit_designer::registry::default_shape_validators;

const SAMPLE: &str = r##"{
  "diagramType": "bpmn",
  "shapes": [
    {
      "id": "start",
      "shapeType": "event",
      "subType": "start",
      "position": { "x": 0, "y": 0 },
      "dimensions": { "width": 36, "height": 36 },
      "text": "Begin",
      "textPlacement": "below"
    },
    {
      "id": "review",
      "shapeType": "task",
      "cornerRadius": 8,
      "position": { "x": 120, "y": -12 },
      "dimensions": { "width": 120, "height": 60 },
      "fillColor": "#e8f0fe"
    }
  ],
  "connectors": [
    {
      "id": "flow1",
      "connectorType": "curved",
      "curvature": 0.5,
      "source": { "shapeId": "start", "anchor": "e" },
      "target": { "shapeId": "review", "anchor": "w" }
    }
  ]
}"##;

#[test]
fn test_parse_sample_document() {
    let doc = DiagramDocument::from_json(SAMPLE).unwrap();
    assert_eq!(doc.diagram_type, DiagramType::Bpmn);
    assert_eq!(doc.len(), 3);

    let start = &doc.shapes[0];
    assert_eq!(start.kind, ShapeKind::event(EventType::Start));
    assert_eq!(start.text.text, "Begin");
    assert_eq!(start.text.text_placement, TextPlacement::Below);

    let review = &doc.shapes[1];
    assert_eq!(review.kind, ShapeKind::Task { corner_radius: 8.0 });
    assert_eq!(review.style.fill_color.as_deref(), Some("#e8f0fe"));

    let flow = &doc.connectors[0];
    assert_eq!(flow.kind, ConnectorKind::Curved { curvature: 0.5 });
    assert_eq!(flow.source.anchor, AnchorPosition::E);
    assert!(flow.arrow_end);
    assert!(!flow.arrow_start);

    assert!(validate_document(&doc, Some(&default_shape_validators())).is_valid());
}

#[test]
fn test_serialized_form_uses_wire_names() {
    let doc = DiagramDocument::from_json(SAMPLE).unwrap();
    let json = doc.to_json_pretty().unwrap();
    assert!(json.contains("\"shapeType\": \"task\""));
    assert!(json.contains("\"connectorType\": \"curved\""));
    assert!(json.contains("\"shapeId\": \"start\""));
    assert_eq!(DiagramDocument::from_json(&json).unwrap(), doc);
}

#[test]
fn test_report_collects_every_problem() {
    let mut doc = DiagramDocument::from_json(SAMPLE).unwrap();
    doc.shapes.push(doc.shapes[0].clone());
    doc.connectors[0].target.shape_id = "nowhere".to_string();

    let report = validate_document(&doc, None);
    assert!(!report.is_valid());
    let messages = report.messages();
    assert!(messages.iter().any(|m| m == "start: duplicate id 'start'"));
    assert!(messages
        .iter()
        .any(|m| m == "flow1: target shape 'nowhere' does not exist"));
}

#[test]
fn test_malformed_json_is_a_document_error() {
    let err = DiagramDocument::from_json("{ \"shapes\": [ { \"id\": 1 } ] }").unwrap_err();
    assert!(matches!(err, diagramkit_core::DiagramError::Document(_)));
}

#[test]
fn test_unknown_anchor_token_is_rejected() {
    let json = SAMPLE.replace("\"anchor\": \"e\"", "\"anchor\": \"east\"");
    assert!(DiagramDocument::from_json(&json).is_err());
}
