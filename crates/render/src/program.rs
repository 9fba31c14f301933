use solids_geometry::{COLOR_STRIDE, Mesh};

use crate::context::{
    AttributeSemantic, GraphicsContext, ProgramLayout, ResolvedAttribute, ShaderStage,
    VertexAttribute,
};
use crate::error::RenderError;

/// A fixed vertex/fragment source pair and the inputs it reads.
#[derive(Debug, Clone, Copy)]
pub struct ShaderPair {
    pub label: &'static str,
    pub vertex: &'static str,
    pub fragment: &'static str,
    pub attributes: &'static [VertexAttribute],
    pub uses_transform: bool,
}

/// A linked program together with the layout it was linked against.
pub struct Program<C: GraphicsContext> {
    pub handle: C::Program,
    pub layout: ProgramLayout,
}

/// Compile, resolve attributes and link a shader pair.
///
/// Any shader that is not handed to the linker is released before an error
/// is returned.
pub fn build_program<C: GraphicsContext>(
    ctx: &mut C,
    shaders: &ShaderPair,
) -> Result<Program<C>, RenderError> {
    let vertex = ctx
        .compile_shader(ShaderStage::Vertex, shaders.vertex)
        .map_err(|log| compile_failed(shaders, ShaderStage::Vertex, log))?;

    let fragment = match ctx.compile_shader(ShaderStage::Fragment, shaders.fragment) {
        Ok(fragment) => fragment,
        Err(log) => {
            ctx.delete_shader(vertex);
            return Err(compile_failed(shaders, ShaderStage::Fragment, log));
        }
    };

    let mut attributes = Vec::with_capacity(shaders.attributes.len());
    for attribute in shaders.attributes {
        match ctx.attribute_location(&vertex, attribute.name) {
            Some(location) => attributes.push(ResolvedAttribute {
                attribute: *attribute,
                location,
            }),
            None => {
                ctx.delete_shader(vertex);
                ctx.delete_shader(fragment);
                tracing::error!(
                    "{}: failed to get attribute location for {}",
                    shaders.label,
                    attribute.name
                );
                return Err(RenderError::AttributeNotFound(attribute.name.to_string()));
            }
        }
    }

    let layout = ProgramLayout {
        label: shaders.label,
        attributes,
        uses_transform: shaders.uses_transform,
    };

    let handle = ctx.link_program(vertex, fragment, &layout).map_err(|log| {
        tracing::error!("{}: failed to link GPU program: {log}", shaders.label);
        RenderError::ProgramLinkFailed(log)
    })?;

    tracing::debug!(
        "{}: linked program with {} attributes",
        shaders.label,
        layout.attributes.len()
    );

    Ok(Program { handle, layout })
}

/// Check a mesh supplies every attribute a program reads, with matching widths.
pub fn check_mesh_layout(mesh: &Mesh, layout: &ProgramLayout) -> Result<(), RenderError> {
    for resolved in &layout.attributes {
        let attribute = resolved.attribute;
        let actual = match attribute.semantic {
            AttributeSemantic::Position => mesh.dimension.components(),
            AttributeSemantic::Color if mesh.colors.is_empty() => 0,
            AttributeSemantic::Color => COLOR_STRIDE,
        };
        if actual != attribute.components {
            return Err(RenderError::MeshLayoutMismatch {
                attribute: attribute.name.to_string(),
                expected: attribute.components,
                actual,
            });
        }
    }
    Ok(())
}

/// Upload a mesh for a program after validating it.
pub fn upload_mesh<C: GraphicsContext>(
    ctx: &mut C,
    program: &Program<C>,
    mesh: &Mesh,
) -> Result<C::Geometry, RenderError> {
    mesh.validate()?;
    check_mesh_layout(mesh, &program.layout)?;
    Ok(ctx.create_geometry(&program.handle, mesh))
}

fn compile_failed(shaders: &ShaderPair, stage: ShaderStage, log: String) -> RenderError {
    tracing::error!("{}: failed to compile {stage} shader: {log}", shaders.label);
    RenderError::ShaderCompileFailed { stage, log }
}
