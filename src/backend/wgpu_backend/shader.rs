//! WGSL source for the lit mesh pipeline

/// Standard-material shading under one directional light
///
/// Group 0 is per frame, group 1 per object, group 2 per material.
pub const MESH_SHADER: &str = r#"
struct FrameUniform {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    // xyz = direction towards the light
    light_direction: vec4<f32>,
    // xyz = color, w = intensity
    light_color: vec4<f32>,
    ambient: vec4<f32>,
    // x > 0.5: target is not sRGB, encode by hand
    flags: vec4<f32>,
}

struct ObjectUniform {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
}

struct MaterialUniform {
    base_color: vec4<f32>,
    metallic_roughness: vec4<f32>,
}

@group(0) @binding(0) var<uniform> frame: FrameUniform;
@group(1) @binding(0) var<uniform> object: ObjectUniform;
@group(2) @binding(0) var<uniform> material: MaterialUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;

    let world_pos = object.model * vec4<f32>(in.position, 1.0);
    out.world_position = world_pos.xyz;
    out.clip_position = frame.view_proj * world_pos;
    out.world_normal = (object.normal_matrix * vec4<f32>(in.normal, 0.0)).xyz;

    return out;
}

fn linear_to_srgb(color: vec3<f32>) -> vec3<f32> {
    let c = clamp(color, vec3<f32>(0.0), vec3<f32>(1.0));
    let low = c * 12.92;
    let high = 1.055 * pow(c, vec3<f32>(1.0 / 2.4)) - 0.055;
    return select(high, low, c <= vec3<f32>(0.0031308));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(in.world_normal);
    let light_dir = normalize(frame.light_direction.xyz);
    let view_dir = normalize(frame.camera_position.xyz - in.world_position);
    let half_dir = normalize(light_dir + view_dir);

    let albedo = material.base_color.rgb;
    let metallic = material.metallic_roughness.x;
    let roughness = material.metallic_roughness.y;
    let radiance = frame.light_color.rgb * frame.light_color.w;

    // Lambert diffuse; metals have none
    let ndotl = max(dot(normal, light_dir), 0.0);
    let diffuse = albedo * (1.0 - metallic) * ndotl;

    // Blinn-Phong highlight, fading out as the surface gets rough
    let shininess = mix(128.0, 2.0, roughness);
    let spec_color = mix(vec3<f32>(0.04), albedo, metallic);
    let lit = select(0.0, 1.0, ndotl > 0.0);
    let specular = spec_color * pow(max(dot(normal, half_dir), 0.0), shininess) * (1.0 - roughness) * lit;

    var color = (diffuse + specular) * radiance + frame.ambient.rgb * albedo;
    if frame.flags.x > 0.5 {
        color = linear_to_srgb(color);
    }

    return vec4<f32>(color, material.base_color.a);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn parse() -> naga::Module {
        naga::front::wgsl::parse_str(MESH_SHADER)
            .unwrap_or_else(|e| panic!("{}", e.emit_to_string(MESH_SHADER)))
    }

    #[test]
    fn shader_validates() {
        let module = parse();
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        );
        validator.validate(&module).unwrap();
    }

    #[test]
    fn shader_exposes_both_entry_points() {
        let module = parse();
        let names: Vec<_> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"vs_main"));
        assert!(names.contains(&"fs_main"));
    }

    #[test]
    fn uniform_sizes_match_wgsl_layout() {
        use super::super::FrameUniform;
        use crate::resources::MaterialUniformData;
        use crate::scene::TransformUniformData;

        assert_eq!(std::mem::size_of::<FrameUniform>(), 64 + 5 * 16);
        assert_eq!(std::mem::size_of::<TransformUniformData>(), 2 * 64);
        assert_eq!(std::mem::size_of::<MaterialUniformData>(), 2 * 16);
    }
}
