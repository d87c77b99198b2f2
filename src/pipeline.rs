//! The asynchronous caption → enhance and story sequences.
//!
//! Pipeline functions only talk to the services. Their results carry the
//! generation token they were started with and are applied by the session
//! on the UI thread, which discards anything that went stale meanwhile.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::services::Services;
use crate::state::GenerationToken;
use crate::style::ArtStyle;

/// Everything needed to enhance the current sketch
#[derive(Debug, Clone)]
pub struct EnhancementRequest {
    pub token: GenerationToken,
    pub sketch_png: Arc<[u8]>,
    pub style: ArtStyle,
}

#[derive(Debug, Clone)]
pub struct EnhancedArt {
    pub sketch_png: Arc<[u8]>,
    pub description: String,
    pub image: Vec<u8>,
    pub style: ArtStyle,
}

#[derive(Debug)]
pub struct EnhancementResult {
    pub token: GenerationToken,
    pub outcome: Result<EnhancedArt, ServiceError>,
}

/// Story generation for one history entry
#[derive(Debug, Clone)]
pub struct StoryRequest {
    pub token: GenerationToken,
    pub entry: Uuid,
    pub description: String,
    pub style: ArtStyle,
}

#[derive(Debug)]
pub struct StoryResult {
    pub token: GenerationToken,
    pub entry: Uuid,
    pub outcome: Result<String, ServiceError>,
}

#[derive(Debug)]
pub enum PipelineMessage {
    Enhancement(EnhancementResult),
    Story(StoryResult),
}

/// Describes the sketch, then asks for enhanced art in the requested style
pub async fn run_enhancement(services: Services, request: EnhancementRequest) -> EnhancementResult {
    let EnhancementRequest {
        token,
        sketch_png,
        style,
    } = request;
    log::info!("Enhancement {} started ({} style)", token, style);

    let outcome = enhance_sketch(&services, token, sketch_png, style).await;
    if let Err(err) = &outcome {
        log::warn!("Enhancement {} failed: {}", token, err);
    }
    EnhancementResult { token, outcome }
}

async fn enhance_sketch(
    services: &Services,
    token: GenerationToken,
    sketch_png: Arc<[u8]>,
    style: ArtStyle,
) -> Result<EnhancedArt, ServiceError> {
    let description = services.captioner.describe(sketch_png.clone()).await?;
    log::debug!("Enhancement {} caption: {:?}", token, description);

    let image = services.enhancer.enhance(description.clone(), style).await?;
    if image.is_empty() {
        return Err(ServiceError::InvalidResponse {
            service: "image enhancer",
            reason: "empty image".to_owned(),
        });
    }

    Ok(EnhancedArt {
        sketch_png,
        description,
        image,
        style,
    })
}

pub async fn run_story(services: Services, request: StoryRequest) -> StoryResult {
    let StoryRequest {
        token,
        entry,
        description,
        style,
    } = request;
    log::info!("Story {} started for entry {}", token, entry);

    let outcome = services.story_writer.write_story(description, style).await;
    if let Err(err) = &outcome {
        log::warn!("Story {} failed: {}", token, err);
    }
    StoryResult {
        token,
        entry,
        outcome,
    }
}

/// Runs pipeline futures off the UI thread and collects their results in a
/// mailbox that the UI drains once per frame.
#[derive(Clone)]
pub struct PipelineRunner {
    services: Services,
    mailbox: Arc<Mutex<Vec<PipelineMessage>>>,
}

impl std::fmt::Debug for PipelineRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRunner")
            .field("pending_messages", &self.mailbox.lock().len())
            .finish()
    }
}

impl PipelineRunner {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            mailbox: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Starts an enhancement; `notify` runs once the result is in the mailbox
    pub fn spawn_enhancement(&self, request: EnhancementRequest, notify: impl Fn() + Send + 'static) {
        let services = self.services.clone();
        let mailbox = self.mailbox.clone();
        spawn(async move {
            let result = run_enhancement(services, request).await;
            mailbox.lock().push(PipelineMessage::Enhancement(result));
            notify();
        });
    }

    pub fn spawn_story(&self, request: StoryRequest, notify: impl Fn() + Send + 'static) {
        let services = self.services.clone();
        let mailbox = self.mailbox.clone();
        spawn(async move {
            let result = run_story(services, request).await;
            mailbox.lock().push(PipelineMessage::Story(result));
            notify();
        });
    }

    /// Takes every result delivered since the last call
    pub fn drain(&self) -> Vec<PipelineMessage> {
        std::mem::take(&mut *self.mailbox.lock())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn(task: impl Future<Output = ()> + Send + 'static) {
    std::thread::spawn(move || futures::executor::block_on(task));
}

#[cfg(target_arch = "wasm32")]
fn spawn(task: impl Future<Output = ()> + Send + 'static) {
    wasm_bindgen_futures::spawn_local(task);
}
