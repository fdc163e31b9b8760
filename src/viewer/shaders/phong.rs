const SOURCE: &str = "
struct Uniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec4<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world = uniforms.model * vec4<f32>(vertex.position.xyz, 1.0);
    out.world_position = world.xyz;
    out.normal = (uniforms.model * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.clip_position = uniforms.view_proj * world;
    return out;
}

@fragment
fn fs_main(fragment: VertexOutput) -> @location(0) vec4<f32> {
    let object_color = vec3<f32>(0.0, 1.0, 1.0);
    let light_color = vec3<f32>(1.0, 1.0, 1.0);
    let light_position = vec3<f32>(10.0, 10.0, 10.0);

    let ambient_color = light_color * 0.1;

    let normal = normalize(fragment.normal);
    let light_dir = normalize(light_position - fragment.world_position);
    let diffuse_color = light_color * max(dot(normal, light_dir), 0.0);

    return vec4<f32>((ambient_color + diffuse_color) * object_color, 1.0);
}
";

pub fn create_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    super::create_shader(device, "phong", SOURCE)
}
