//! Stepwise: a model-driven step wizard engine.
//!
//! A wizard is a sequence of [`WizardStep`]s, each backed by a
//! [`WizardModel`]. The engine takes care of:
//!
//! - **Flattening**: steps may create dependent steps, which are inserted
//!   directly after them, recursively.
//! - **Visibility**: hidden steps are skipped by navigation. A wizard needs
//!   at least one visible step.
//! - **Navigation**: forward and back, gated by each step's conditions, with
//!   hook failures reported without moving.
//! - **Completion**: every distinct model is finished or skipped exactly
//!   once, then steps and models are disposed.
//!
//! Hosts bind UI to [`ModelWizard::navigation`] and the wizard's signals;
//! steps drive the wizard through a [`WizardFacade`].
//!
//! # Logging
//!
//! The engine logs under the `stepwise::wizard`, `stepwise::navigation` and
//! `stepwise::model` targets. See [`stepwise_core::logging`].

mod config;
mod error;
mod facade;
mod listener;
mod model;
mod navigation;
mod step;
mod wizard;

pub use config::{EnterPolicy, WizardConfig};
pub use error::{HookError, HookResult, Result, StepPhase, WizardError};
pub use facade::{FacadeRequest, WizardFacade};
pub use listener::{ListenerId, WizardListener, WizardResult};
pub use model::{ModelHandle, ModelId, ModelState, WizardModel};
pub use navigation::NavigationProperties;
pub use step::{BoxedStep, StepBase, WizardStep};
pub use wizard::{ModelWizard, ModelWizardBuilder, WizardState};
