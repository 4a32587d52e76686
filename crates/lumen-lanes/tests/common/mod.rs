#![allow(dead_code)]

use lumen_core::math::{Mat4, Vec3};
use lumen_core::renderer::api::*;
use lumen_core::renderer::error::ResourceError;
use lumen_core::renderer::scene::{Drawable, Viewer};
use lumen_core::renderer::shader::{
    Shader, ShaderEvent, ShaderSignals, UniformLocation, UniformValue,
};
use lumen_core::renderer::traits::{GraphicsDevice, MaterialBinder};
use lumen_lanes::{ForwardRenderTechnique, ForwardSettings, TechniqueResources};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Everything the device and the material binder were asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    WriteBuffer {
        buffer: BufferId,
        len: usize,
    },
    SetVertexBuffer(BufferId, VertexLayout),
    SetIndexBuffer(Option<BufferId>),
    SetInstanceBuffer(BufferId, VertexLayout),
    SetTexture(u32, TextureId),
    SetSampler(u32, SamplerId),
    SetWorldMatrix(Mat4),
    ClearDepth,
    SetDepthCompare(CompareFunction),
    SetBlendState(BlendState),
    Draw {
        first: u32,
        count: u32,
    },
    DrawIndexed {
        first: u32,
        count: u32,
    },
    DrawInstanced {
        vertex_count: u32,
        instances: u32,
    },
    DrawIndexedInstanced {
        index_count: u32,
        instances: u32,
    },
    ApplyPipeline(PipelineId, ShaderFlags),
    ApplyMaterial(MaterialId, ShaderFlags),
    Drawable(u32),
}

impl Event {
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Event::Draw { .. }
                | Event::DrawIndexed { .. }
                | Event::DrawInstanced { .. }
                | Event::DrawIndexedInstanced { .. }
        )
    }
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

#[derive(Debug)]
pub struct MockDevice {
    pub log: EventLog,
    pub instancing: bool,
    pub fail_writes: bool,
    pub writes: Vec<(BufferId, Vec<u8>)>,
    blend: BlendState,
    compare: CompareFunction,
    next_id: usize,
}

impl MockDevice {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            instancing: true,
            fail_writes: false,
            writes: Vec::new(),
            blend: BlendState::DISABLED,
            compare: CompareFunction::Less,
            next_id: 100,
        }
    }

    fn push(&self, event: Event) {
        self.log.borrow_mut().push(event);
    }

    fn next(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }
}

impl GraphicsDevice for MockDevice {
    fn create_buffer(&mut self, _descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        Ok(BufferId(self.next()))
    }

    fn create_buffer_with_data(
        &mut self,
        _descriptor: &BufferDescriptor,
        _data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        Ok(BufferId(self.next()))
    }

    fn write_buffer(&mut self, id: BufferId, _offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        if self.fail_writes {
            return Err(ResourceError::BackendError("device lost".to_string()));
        }
        self.push(Event::WriteBuffer {
            buffer: id,
            len: data.len(),
        });
        self.writes.push((id, data.to_vec()));
        Ok(())
    }

    fn destroy_buffer(&mut self, _id: BufferId) -> Result<(), ResourceError> {
        Ok(())
    }

    fn create_texture(
        &mut self,
        _descriptor: &TextureDescriptor,
        _data: &[u8],
    ) -> Result<TextureId, ResourceError> {
        Ok(TextureId(self.next()))
    }

    fn destroy_texture(&mut self, _id: TextureId) -> Result<(), ResourceError> {
        Ok(())
    }

    fn create_sampler(&mut self, _descriptor: &SamplerDescriptor) -> Result<SamplerId, ResourceError> {
        Ok(SamplerId(self.next()))
    }

    fn destroy_sampler(&mut self, _id: SamplerId) -> Result<(), ResourceError> {
        Ok(())
    }

    fn declare_vertex_layout(
        &mut self,
        _layout: VertexLayout,
        _declaration: &VertexDeclaration,
    ) -> Result<(), ResourceError> {
        Ok(())
    }

    fn supports(&self, capability: DeviceCapability) -> bool {
        match capability {
            DeviceCapability::Instancing => self.instancing,
        }
    }

    fn set_vertex_buffer(&mut self, buffer: BufferId, layout: VertexLayout) {
        self.push(Event::SetVertexBuffer(buffer, layout));
    }

    fn set_index_buffer(&mut self, binding: Option<IndexBinding>) {
        self.push(Event::SetIndexBuffer(binding.map(|b| b.buffer)));
    }

    fn set_instance_buffer(&mut self, buffer: BufferId, layout: VertexLayout) {
        self.push(Event::SetInstanceBuffer(buffer, layout));
    }

    fn set_texture(&mut self, unit: u32, texture: TextureId) {
        self.push(Event::SetTexture(unit, texture));
    }

    fn set_sampler(&mut self, unit: u32, sampler: SamplerId) {
        self.push(Event::SetSampler(unit, sampler));
    }

    fn set_world_matrix(&mut self, matrix: &Mat4) {
        self.push(Event::SetWorldMatrix(*matrix));
    }

    fn clear_depth(&mut self) {
        self.push(Event::ClearDepth);
    }

    fn set_depth_test(&mut self, _enabled: bool) {}

    fn set_depth_write(&mut self, _enabled: bool) {}

    fn depth_compare(&self) -> CompareFunction {
        self.compare
    }

    fn set_depth_compare(&mut self, compare: CompareFunction) {
        self.compare = compare;
        self.push(Event::SetDepthCompare(compare));
    }

    fn blend_state(&self) -> BlendState {
        self.blend
    }

    fn set_blend_state(&mut self, state: BlendState) {
        self.blend = state;
        self.push(Event::SetBlendState(state));
    }

    fn draw(&mut self, _topology: PrimitiveTopology, first_vertex: u32, vertex_count: u32) {
        self.push(Event::Draw {
            first: first_vertex,
            count: vertex_count,
        });
    }

    fn draw_indexed(&mut self, _topology: PrimitiveTopology, first_index: u32, index_count: u32) {
        self.push(Event::DrawIndexed {
            first: first_index,
            count: index_count,
        });
    }

    fn draw_instanced(
        &mut self,
        _topology: PrimitiveTopology,
        _first_vertex: u32,
        vertex_count: u32,
        instance_count: u32,
    ) {
        self.push(Event::DrawInstanced {
            vertex_count,
            instances: instance_count,
        });
    }

    fn draw_indexed_instanced(
        &mut self,
        _topology: PrimitiveTopology,
        _first_index: u32,
        index_count: u32,
        instance_count: u32,
    ) {
        self.push(Event::DrawIndexedInstanced {
            index_count,
            instances: instance_count,
        });
    }
}

/// Uniform locations of the lit test shader. Light slot `n` starts at `10 * (n + 1)`.
pub const LIGHT_STRIDE: i32 = 10;
pub const LIGHT_SLOTS: usize = 4;

pub fn light_type_location(slot: usize) -> i32 {
    LIGHT_STRIDE * (slot as i32 + 1)
}

pub struct MockShader {
    id: ShaderId,
    locations: HashMap<String, i32>,
    pub sent: RefCell<Vec<(UniformLocation, UniformValue)>>,
    signals: ShaderSignals,
}

impl MockShader {
    pub fn lit(id: usize) -> Self {
        let mut locations = HashMap::new();
        locations.insert("SceneAmbient".to_string(), 1);
        locations.insert("EyePosition".to_string(), 2);
        locations.insert("TextureOverlay".to_string(), 3);
        locations.insert("LightViewProjMatrix[0]".to_string(), 200);
        for slot in 0..LIGHT_SLOTS {
            let base = light_type_location(slot);
            for (offset, field) in [
                "type",
                "color",
                "factors",
                "parameters1",
                "parameters2",
                "parameters3",
                "shadowMapping",
            ]
            .iter()
            .enumerate()
            {
                locations.insert(format!("Lights[{slot}].{field}"), base + offset as i32);
            }
        }
        Self {
            id: ShaderId(id),
            locations,
            sent: RefCell::new(Vec::new()),
            signals: ShaderSignals::new(),
        }
    }

    /// Every value sent to `location`, oldest first.
    pub fn values_at(&self, location: i32) -> Vec<UniformValue> {
        self.sent
            .borrow()
            .iter()
            .filter(|(l, _)| l.0 == location)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn emit(&self, event: ShaderEvent) {
        self.signals.emit(event);
    }
}

impl Shader for MockShader {
    fn id(&self) -> ShaderId {
        self.id
    }

    fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.locations.get(name).copied().map(UniformLocation)
    }

    fn send_uniform(&self, location: UniformLocation, value: UniformValue) {
        self.sent.borrow_mut().push((location, value));
    }

    fn signals(&self) -> &ShaderSignals {
        &self.signals
    }
}

/// Hands out one lit shader per (pipeline, flags) pair.
pub struct MockMaterials {
    log: EventLog,
    shaders: HashMap<(PipelineId, ShaderFlags), Rc<MockShader>>,
}

impl MockMaterials {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            shaders: HashMap::new(),
        }
    }

    pub fn shader(&mut self, pipeline: PipelineId, flags: ShaderFlags) -> Rc<MockShader> {
        let next_id = self.shaders.len() + 1;
        Rc::clone(
            self.shaders
                .entry((pipeline, flags))
                .or_insert_with(|| Rc::new(MockShader::lit(next_id))),
        )
    }
}

impl MaterialBinder for MockMaterials {
    fn apply_pipeline(
        &mut self,
        _device: &mut dyn GraphicsDevice,
        pipeline: PipelineId,
        flags: ShaderFlags,
    ) -> Rc<dyn Shader> {
        self.log
            .borrow_mut()
            .push(Event::ApplyPipeline(pipeline, flags));
        self.shader(pipeline, flags)
    }

    fn apply_material(
        &mut self,
        _device: &mut dyn GraphicsDevice,
        material: MaterialId,
        flags: ShaderFlags,
    ) {
        self.log
            .borrow_mut()
            .push(Event::ApplyMaterial(material, flags));
    }

    fn diffuse_sampler(&self, material: MaterialId) -> SamplerId {
        SamplerId(1000 + material.0)
    }
}

/// A viewer at the origin looking down -Z.
pub struct Camera;

impl Viewer for Camera {
    fn eye_position(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn forward(&self) -> Vec3 {
        Vec3::NEG_Z
    }
}

pub struct LoggedDrawable {
    pub log: EventLog,
    pub id: u32,
}

impl Drawable for LoggedDrawable {
    fn draw(&self, _device: &mut dyn GraphicsDevice) {
        self.log.borrow_mut().push(Event::Drawable(self.id));
    }
}

pub struct Harness {
    pub log: EventLog,
    pub device: MockDevice,
    pub materials: MockMaterials,
    pub technique: ForwardRenderTechnique,
}

impl Harness {
    pub fn new(settings: ForwardSettings) -> Self {
        Self::with_max_quads(settings, lumen_lanes::render_lane::forward::settings::DEFAULT_MAX_QUADS)
    }

    pub fn with_max_quads(settings: ForwardSettings, max_quads: usize) -> Self {
        let log = EventLog::default();
        let mut device = MockDevice::new(Rc::clone(&log));
        let resources = Rc::new(TechniqueResources::initialize(&mut device, max_quads).unwrap());
        let technique = ForwardRenderTechnique::new(resources, &mut device, settings).unwrap();
        Self {
            materials: MockMaterials::new(Rc::clone(&log)),
            log,
            device,
            technique,
        }
    }

    /// Draws the queue for [`Camera`] after dropping whatever was logged before.
    pub fn draw(&mut self) -> Result<(), lumen_core::renderer::error::RenderError> {
        self.log.borrow_mut().clear();
        let scene = lumen_core::renderer::scene::SceneData::new(&Camera);
        self.technique
            .draw(&scene, &mut self.device, &mut self.materials)
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.borrow().clone()
    }

    pub fn draws(&self) -> Vec<Event> {
        self.events().into_iter().filter(Event::is_draw).collect()
    }

    pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.log.borrow().iter().filter(|e| predicate(e)).count()
    }
}

pub fn mesh(vertex_buffer: usize) -> lumen_data::render_queue::MeshData {
    lumen_data::render_queue::MeshData {
        vertex_buffer: BufferId(vertex_buffer),
        vertex_layout: VertexLayout::Custom(0),
        vertex_count: 24,
        index: Some(IndexBinding {
            buffer: BufferId(vertex_buffer + 1),
            format: IndexFormat::Uint16,
            count: 36,
        }),
        topology: PrimitiveTopology::TriangleList,
    }
}

pub fn translation(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, z))
}

/// `quads` sprite quads, every vertex at `(x, 0, z)`.
pub fn sprite_quads(quads: usize, x: f32, z: f32) -> Vec<SpriteVertex> {
    vec![
        SpriteVertex {
            position: [x, 0.0, z],
            ..Default::default()
        };
        quads * 4
    ]
}
