//! Command Dispatcher
//!
//! One dispatcher per mounted scene component. Owns the component's object
//! registry; commands are applied strictly in the order they are dispatched.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --mount--> Initializing --init_objects--> Ready
//!       ^                                                   |
//!       +---------------------unmount-----------------------+
//! ```
//!
//! Before `Ready`, structural commands and render calls are dropped and
//! answered with [`Reply::Ignored`]; the host races the runtime at startup
//! and early commands carry no meaning yet.

use std::sync::Arc;

use serde_json::Value;

use super::{Command, DispatchError, HostCall, Reply};
use crate::render::{RenderBridge, Viewport};
use crate::runtime::EmbeddedRuntime;
use crate::scene::ObjectRegistry;

/// The host element a scene component draws into.
pub trait Surface: Send + Sync {
    /// Current client size, in device pixels.
    fn client_size(&self) -> Viewport;
}

impl<F> Surface for F
where
    F: Fn() -> Viewport + Send + Sync,
{
    fn client_size(&self) -> Viewport {
        self()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
}

pub struct CommandDispatcher<R> {
    registry: ObjectRegistry,
    render: Arc<RenderBridge<R>>,
    surface: Box<dyn Surface>,
    viewport: Viewport,
    lifecycle: Lifecycle,
}

impl<R: EmbeddedRuntime> CommandDispatcher<R> {
    pub fn new(render: Arc<RenderBridge<R>>, surface: impl Surface + 'static) -> Self {
        Self {
            registry: ObjectRegistry::new(),
            render,
            surface: Box::new(surface),
            viewport: Viewport::default(),
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The component's element is attached; wait for `init_objects`.
    pub fn mount(&mut self) {
        if self.lifecycle == Lifecycle::Uninitialized {
            self.lifecycle = Lifecycle::Initializing;
            crate::debug!("scene"; "mounted");
        }
    }

    /// Drop all scene state. A later `mount` starts a fresh session in which
    /// previously used ids are available again.
    pub fn unmount(&mut self) {
        self.registry = ObjectRegistry::new();
        self.viewport = Viewport::default();
        self.lifecycle = Lifecycle::Uninitialized;
        crate::debug!("scene"; "unmounted");
    }

    /// Decode and dispatch a positional host call.
    ///
    /// Calls that the current lifecycle drops are not decoded, so a malformed
    /// early call is ignored rather than reported.
    pub async fn dispatch_call(&mut self, call: HostCall) -> Result<Reply, DispatchError> {
        if !self.accepts(&call.method) {
            return Ok(self.ignore(&call.method));
        }
        let command = Command::from_call(&call.method, call.args)?;
        self.dispatch(command).await
    }

    pub async fn dispatch(&mut self, command: Command) -> Result<Reply, DispatchError> {
        if !self.accepts(command.method()) {
            return Ok(self.ignore(command.method()));
        }

        match command {
            Command::Create {
                kind,
                id,
                parent_id,
                args,
            } => {
                self.registry.create(id, kind, parent_id, args)?;
            }
            Command::Name { id, name } => {
                return Ok(Reply::Name(self.registry.rename(&id, name)?));
            }
            Command::Move { id, position } => self.registry.move_to(&id, position)?,
            Command::Scale { id, scale } => self.registry.scale(&id, scale)?,
            Command::Rotate { id, rotation } => self.registry.rotate(&id, rotation)?,
            Command::Visible { id, visible } => self.registry.set_visible(&id, visible)?,
            Command::Delete { id } => {
                let removed = self.registry.delete(&id)?;
                crate::debug!("scene"; "deleted {} objects under `{}`", removed.len(), id);
            }
            Command::Attach { id, parent_id } => self.registry.attach(&id, parent_id)?,
            Command::Resize => self.resize(),
            Command::InitObjects { data } => self.init_objects(&data),
            Command::RunUserFunction { data } => self.render.run_user_function(data).await?,
            Command::Draw { data } => {
                self.render
                    .draw(data, &self.registry, self.viewport)
                    .await?;
            }
        }
        Ok(Reply::Done)
    }

    fn accepts(&self, method: &str) -> bool {
        match self.lifecycle {
            Lifecycle::Uninitialized => false,
            Lifecycle::Initializing => matches!(method, "resize" | "init_objects"),
            Lifecycle::Ready => true,
        }
    }

    fn ignore(&self, method: &str) -> Reply {
        crate::debug!("scene"; "`{}` ignored while {:?}", method, self.lifecycle);
        Reply::Ignored
    }

    fn resize(&mut self) {
        let size = self.surface.client_size();
        if size != self.viewport {
            crate::debug!("scene"; "resize {}x{}", size.width, size.height);
            self.viewport = size;
        }
    }

    /// Resize, then on the first call become ready and create the initial
    /// objects listed under `data.objects`.
    fn init_objects(&mut self, data: &Value) {
        self.resize();
        if self.lifecycle == Lifecycle::Ready {
            return;
        }
        self.lifecycle = Lifecycle::Ready;

        let Some(objects) = data.get("objects").and_then(Value::as_array) else {
            return;
        };
        for (index, entry) in objects.iter().enumerate() {
            if let Err(e) = self.seed(entry) {
                crate::log!("scene"; "skipping initial object #{}: {}", index, e);
            }
        }
    }

    fn seed(&mut self, entry: &Value) -> Result<(), DispatchError> {
        let args = match entry {
            Value::Array(args) => args.clone(),
            other => vec![other.clone()],
        };
        if let Command::Create {
            kind,
            id,
            parent_id,
            args,
        } = Command::from_call("create", args)?
        {
            self.registry.create(id, kind, parent_id, args)?;
        }
        Ok(())
    }
}
