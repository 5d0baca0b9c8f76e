//! Graphs shared by the codec tests and benchmarks
#![allow(dead_code)]

use tf_pcf::{AttributeValue, DmxHeader, Element, ElementHandle, ElementId, Graph};

fn id(seed: u8) -> ElementId {
    ElementId(std::array::from_fn(|i| seed.wrapping_mul(31).wrapping_add(i as u8)))
}

/// Particle file shaped graph holding every attribute kind, with a reference cycle.
pub fn sample_graph(version: u32) -> Graph {
    let mut graph = Graph::new(DmxHeader::binary(version, "pcf", 1));

    let root = graph.push(Element::new("DmElement", "untitled", id(0)));
    let fire = graph.push(
        Element::new("DmeParticleSystemDefinition", "fire_large", id(1))
            .with_attribute("max_particles", 128)
            .with_attribute("material", "effects/fire_cloud1.vmt")
            .with_attribute("radius", 12.5f32)
            .with_attribute("cull_replacement_definition", "")
            .with_attribute("screen_space_effect", false),
    );
    let smoke = graph.push(
        Element::new("DmeParticleSystemDefinition", "fire_smoke", id(2))
            .with_attribute("max_particles", 64)
            .with_attribute("material", "effects/fire_cloud1.vmt"),
    );
    let operator = graph.push(
        Element::new("DmeParticleOperator", "Alpha Fade In Random", id(3))
            .with_attribute("functionName", "Alpha Fade In Random")
            .with_attribute("operator start fadein", 0.0f32)
            .with_attribute("proportional 0/1", true),
    );

    // tags 7 and 21 hold object ids before binary version 3
    let (duration, times) = if version < 3 {
        (
            AttributeValue::ObjectId(id(9)),
            AttributeValue::ObjectIdArray(vec![id(10), id(11)]),
        )
    } else {
        (
            AttributeValue::Time(25_000),
            AttributeValue::TimeArray(vec![0, 10_000]),
        )
    };

    let every_kind = [
        ("blob", AttributeValue::Binary(vec![0, 1, 2, 0xFF])),
        ("duration", duration),
        ("color", AttributeValue::Color([255, 128, 0, 255])),
        ("offset2", AttributeValue::Vector2([1.0, -1.0])),
        ("offset", AttributeValue::Vector3([0.0, 0.5, 32.0])),
        ("plane", AttributeValue::Vector4([1.0, 2.0, 3.0, 4.0])),
        ("angles", AttributeValue::QAngle([90.0, 0.0, -45.0])),
        ("orientation", AttributeValue::Quaternion([0.0, 0.0, 0.0, 1.0])),
        (
            "transform",
            AttributeValue::Matrix(std::array::from_fn(|i| i as f32 * 0.25)),
        ),
        ("parent", AttributeValue::Element(Some(fire))),
        ("nothing", AttributeValue::Element(None)),
        (
            "children",
            AttributeValue::ElementArray(vec![Some(smoke), None, Some(operator)]),
        ),
        ("counts", AttributeValue::IntArray(vec![1, -2, i32::MAX])),
        ("weights", AttributeValue::FloatArray(vec![0.1, 0.2, f32::MIN_POSITIVE])),
        ("flags", AttributeValue::BoolArray(vec![true, false, true])),
        (
            "names",
            AttributeValue::StringArray(vec!["fire_large".into(), String::new(), "ünïcode".into()]),
        ),
        ("blobs", AttributeValue::BinaryArray(vec![vec![], vec![7; 3]])),
        ("times", times),
        ("colors", AttributeValue::ColorArray(vec![[1, 2, 3, 4]])),
        ("points2", AttributeValue::Vector2Array(vec![[0.0, 1.0], [2.0, 3.0]])),
        ("points", AttributeValue::Vector3Array(vec![[0.0, 1.0, 2.0]])),
        ("points4", AttributeValue::Vector4Array(vec![])),
        ("rotations", AttributeValue::QAngleArray(vec![[0.0, 180.0, 0.0]])),
        ("quaternions", AttributeValue::QuaternionArray(vec![[0.5; 4]])),
        ("transforms", AttributeValue::MatrixArray(vec![[1.0; 16], [0.0; 16]])),
        ("empty", AttributeValue::IntArray(vec![])),
    ];
    if let Some(element) = graph.element_mut(operator) {
        for (name, value) in every_kind {
            element.set_attribute(name, value);
        }
    }

    if let Some(element) = graph.element_mut(root) {
        element.set_attribute(
            "particleSystemDefinitions",
            AttributeValue::ElementArray(vec![Some(fire), Some(smoke)]),
        );
    }
    if let Some(element) = graph.element_mut(fire) {
        element.set_attribute("children", AttributeValue::ElementArray(vec![Some(smoke)]));
        element.set_attribute("operators", AttributeValue::ElementArray(vec![Some(operator)]));
    }
    if let Some(element) = graph.element_mut(smoke) {
        element.set_attribute("parent", fire);
    }

    graph
}

/// Handle of the element called `name`, panicking when it is missing.
pub fn handle(graph: &Graph, name: &str) -> ElementHandle {
    graph
        .find_by_name(name)
        .unwrap_or_else(|| panic!("{name} should be in the graph"))
}
