//! WGSL sources for both demos, plus naga-based validation and reflection
//! that backends use to compile shaders and resolve attribute locations.

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{Binding, Handle, Module, Type, TypeInner};

use crate::context::{AttributeSemantic, ShaderStage, VertexAttribute};
use crate::program::ShaderPair;

/// Entry point every vertex module exports.
pub const VERTEX_ENTRY: &str = "vs_main";
/// Entry point every fragment module exports.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Vertex stage for the solids: per-draw MVP uniform, position + color inputs.
pub const SOLID_VERTEX_SHADER: &str = r#"
struct Uniforms {
    mvp: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) a_position: vec3<f32>,
    @location(1) a_color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) v_color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.mvp * vec4<f32>(vertex.a_position, 1.0);
    out.v_color = vertex.a_color;
    return out;
}
"#;

/// Fragment stage for the solids: interpolated vertex color.
pub const SOLID_FRAGMENT_SHADER: &str = r#"
@fragment
fn fs_main(@location(0) v_color: vec4<f32>) -> @location(0) vec4<f32> {
    return v_color;
}
"#;

/// Vertex stage for the hello triangle: 2D position passed straight to clip space.
pub const TRIANGLE_VERTEX_SHADER: &str = r#"
@vertex
fn vs_main(@location(0) a_position: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(a_position, 0.0, 1.0);
}
"#;

/// Fragment stage for the hello triangle: fixed indigo.
pub const TRIANGLE_FRAGMENT_SHADER: &str = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(0.294, 0.0, 0.51, 1.0);
}
"#;

pub const SOLID_SHADERS: ShaderPair = ShaderPair {
    label: "solids",
    vertex: SOLID_VERTEX_SHADER,
    fragment: SOLID_FRAGMENT_SHADER,
    attributes: &[
        VertexAttribute {
            name: "a_position",
            semantic: AttributeSemantic::Position,
            components: 3,
        },
        VertexAttribute {
            name: "a_color",
            semantic: AttributeSemantic::Color,
            components: 4,
        },
    ],
    uses_transform: true,
};

pub const TRIANGLE_SHADERS: ShaderPair = ShaderPair {
    label: "hello_triangle",
    vertex: TRIANGLE_VERTEX_SHADER,
    fragment: TRIANGLE_FRAGMENT_SHADER,
    attributes: &[VertexAttribute {
        name: "a_position",
        semantic: AttributeSemantic::Position,
        components: 2,
    }],
    uses_transform: false,
};

/// Interface of a validated shader entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderInterface {
    pub stage: ShaderStage,
    /// Named `@location` inputs of the entry point, including struct members.
    pub inputs: Vec<(String, u32)>,
    /// `@location` outputs of the entry point.
    pub outputs: Vec<u32>,
}

impl ShaderInterface {
    /// Location of the entry point input called `name`.
    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.inputs
            .iter()
            .find(|(input, _)| input == name)
            .map(|&(_, location)| location)
    }

    /// Check that every fragment input is written by this vertex stage.
    pub fn check_link(&self, fragment: &ShaderInterface) -> Result<(), String> {
        if self.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
            return Err(format!(
                "expected vertex and fragment shaders, got {} and {}",
                self.stage, fragment.stage
            ));
        }
        for (name, location) in &fragment.inputs {
            if !self.outputs.contains(location) {
                return Err(format!(
                    "fragment input `{name}` at location {location} has no matching vertex output"
                ));
            }
        }
        Ok(())
    }
}

/// Entry point name every module of `stage` exports.
pub fn entry_point_name(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => VERTEX_ENTRY,
        ShaderStage::Fragment => FRAGMENT_ENTRY,
    }
}

/// Parse and validate a WGSL source, then reflect the entry point for `stage`.
///
/// Errors carry the naga diagnostic rendered against the source.
pub fn reflect_shader(stage: ShaderStage, source: &str) -> Result<ShaderInterface, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    validator
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    let (naga_stage, attribute) = match stage {
        ShaderStage::Vertex => (naga::ShaderStage::Vertex, "@vertex"),
        ShaderStage::Fragment => (naga::ShaderStage::Fragment, "@fragment"),
    };
    let entry = entry_point_name(stage);
    let Some(entry_point) = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == naga_stage && ep.name == entry)
    else {
        return Err(format!("missing {attribute} entry point `{entry}`"));
    };

    let function = &entry_point.function;
    let mut inputs = Vec::new();
    for argument in &function.arguments {
        collect_locations(
            &module,
            argument.name.as_deref(),
            argument.ty,
            argument.binding.as_ref(),
            &mut inputs,
        );
    }

    let mut outputs = Vec::new();
    if let Some(result) = &function.result {
        let mut named = Vec::new();
        collect_locations(&module, None, result.ty, result.binding.as_ref(), &mut named);
        outputs = named.into_iter().map(|(_, location)| location).collect();
    }

    Ok(ShaderInterface {
        stage,
        inputs,
        outputs,
    })
}

/// Gather `@location` bindings from a value, descending into struct members.
fn collect_locations(
    module: &Module,
    name: Option<&str>,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<(String, u32)>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => {
            out.push((name.unwrap_or_default().to_string(), *location));
        }
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(
                        module,
                        member.name.as_deref(),
                        member.ty,
                        member.binding.as_ref(),
                        out,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(source: &str) -> ShaderInterface {
        reflect_shader(ShaderStage::Vertex, source).unwrap()
    }

    #[test]
    fn solid_attributes_resolve_from_struct_members() {
        let shader = vertex(SOLID_VERTEX_SHADER);
        assert_eq!(shader.attribute_location("a_position"), Some(0));
        assert_eq!(shader.attribute_location("a_color"), Some(1));
        assert_eq!(shader.outputs, vec![0]);
    }

    #[test]
    fn triangle_attribute_resolves_from_parameter() {
        let shader = vertex(TRIANGLE_VERTEX_SHADER);
        assert_eq!(shader.attribute_location("a_position"), Some(0));
        assert!(shader.outputs.is_empty());
    }

    #[test]
    fn outputs_are_not_inputs() {
        let shader = vertex(SOLID_VERTEX_SHADER);
        assert_eq!(shader.attribute_location("v_color"), None);
        assert_eq!(shader.attribute_location("a_normal"), None);
        assert_eq!(shader.attribute_location("a_pos"), None);
    }

    #[test]
    fn commented_declarations_are_ignored() {
        let source = r#"
// old: @location(7) a_color
@vertex
fn vs_main(@location(1) a_color: vec4<f32>) -> @builtin(position) vec4<f32> {
    return a_color;
}
"#;
        assert_eq!(vertex(source).attribute_location("a_color"), Some(1));
    }

    #[test]
    fn invalid_source_fails_to_compile() {
        let source = r#"
@vertex
fn vs_main(@location(1) a_color: vec4<f32>) -> @builtin(position) vec4<f32> {
    this is not wgsl
}
"#;
        assert!(reflect_shader(ShaderStage::Vertex, source).is_err());
    }

    #[test]
    fn type_errors_fail_validation() {
        let source = r#"
@vertex
fn vs_main(@location(0) a_position: vec2<f32>) -> @builtin(position) vec4<f32> {
    return a_position;
}
"#;
        assert!(reflect_shader(ShaderStage::Vertex, source).is_err());
    }

    #[test]
    fn entry_points_required_per_stage() {
        assert!(reflect_shader(ShaderStage::Fragment, SOLID_FRAGMENT_SHADER).is_ok());
        assert!(reflect_shader(ShaderStage::Fragment, TRIANGLE_FRAGMENT_SHADER).is_ok());

        let err = reflect_shader(ShaderStage::Fragment, SOLID_VERTEX_SHADER).unwrap_err();
        assert!(err.contains("fs_main"));

        let renamed = TRIANGLE_VERTEX_SHADER.replace("vs_main", "main");
        let err = reflect_shader(ShaderStage::Vertex, &renamed).unwrap_err();
        assert!(err.contains("vs_main"));
    }

    #[test]
    fn link_checks_stage_interfaces() {
        let solid_vs = vertex(SOLID_VERTEX_SHADER);
        let solid_fs = reflect_shader(ShaderStage::Fragment, SOLID_FRAGMENT_SHADER).unwrap();
        let triangle_vs = vertex(TRIANGLE_VERTEX_SHADER);

        assert!(solid_vs.check_link(&solid_fs).is_ok());
        let err = triangle_vs.check_link(&solid_fs).unwrap_err();
        assert!(err.contains("v_color"));
        assert!(solid_fs.check_link(&solid_vs).is_err());
    }

    #[test]
    fn shader_pairs_declare_their_attributes() {
        for pair in [SOLID_SHADERS, TRIANGLE_SHADERS] {
            let shader = vertex(pair.vertex);
            for attribute in pair.attributes {
                assert!(
                    shader.attribute_location(attribute.name).is_some(),
                    "{} missing {}",
                    pair.label,
                    attribute.name
                );
            }
        }
    }
}
