use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use zigbee_api::models::{DeviceId, Rule};
use zigbee_api::{ApiResponse, Gateway};

use crate::codec::RuleCodec;
use crate::errors::PanelError;
use crate::models::SystemSnapshot;
use crate::views::{RuleEditView, RuleListView, Screen, StatusEditView, StatusView};

pub use edit::{RuleEdit, apply_rule_edit};
pub use intent::Intent;
pub use state::{Activity, Loading, PanelState, ViewState, clamp_selection};

mod edit;
mod intent;
mod state;

/// Released on drop, so a cancelled operation frees the controller as well.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the panel state and sequences every exchange with the backend.
///
/// Viewing states are only entered after a fresh snapshot; mutations are
/// followed by an unconditional refresh. One operation runs at a time, the
/// others fail with [`PanelError::Busy`].
pub struct ViewController {
    gateway: Arc<dyn Gateway>,
    codec: RuleCodec,
    login_url: String,
    state: RwLock<PanelState>,
    in_flight: AtomicBool,
}

impl ViewController {
    pub fn new(gateway: Arc<dyn Gateway>, codec: RuleCodec, login_url: impl Into<String>) -> Self {
        Self {
            gateway,
            codec,
            login_url: login_url.into(),
            state: RwLock::new(PanelState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn codec(&self) -> &RuleCodec {
        &self.codec
    }

    pub async fn state(&self) -> PanelState {
        self.state.read().await.clone()
    }

    pub async fn view(&self) -> ViewState {
        self.state.read().await.view
    }

    pub async fn active_rule(&self) -> Option<usize> {
        self.state.read().await.active_rule
    }

    pub async fn snapshot(&self) -> Option<SystemSnapshot> {
        self.state.read().await.snapshot.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<FlightGuard<'_>, PanelError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                tracing::debug!("operation rejected, another one is in flight");
                PanelError::Busy
            })?;

        Ok(FlightGuard(&self.in_flight))
    }

    pub async fn init(&self) -> Result<(), PanelError> {
        let _guard = self.begin()?;
        {
            let mut state = self.state.write().await;
            state.first_load = true;
        }

        self.refresh(Loading::Initializing).await?;
        self.settle(|state| state.view = ViewState::ShowingStatus).await;

        tracing::info!("panel initialized");
        Ok(())
    }

    /// Refreshes, then shows `view`.
    ///
    /// The rule editor opens on the current selection. After the first rule was
    /// deleted there is none, so the editor composes a new rule until another
    /// one is selected.
    pub async fn go_to(&self, view: ViewState) -> Result<(), PanelError> {
        if view == ViewState::EditingRule {
            let active_rule = self.active_rule().await;
            return self.select_rule(active_rule).await;
        }

        let _guard = self.begin()?;
        self.navigate(view).await
    }

    /// Opens the rule editor; `None` composes a new rule.
    pub async fn select_rule(&self, index: Option<usize>) -> Result<(), PanelError> {
        let _guard = self.begin()?;

        self.refresh(Loading::Downloading).await?;
        self.settle(|state| {
            let rule_count = state.rule_count();
            state.active_rule = index.and_then(|index| clamp_selection(Some(index), rule_count));
            state.view = ViewState::EditingRule;
        })
        .await;

        Ok(())
    }

    pub async fn cancel(&self) -> Result<(), PanelError> {
        let _guard = self.begin()?;
        let target = self.view().await.cancel_target();

        self.navigate(target).await
    }

    pub async fn submit_device_state(&self, state: BTreeMap<DeviceId, bool>) -> Result<(), PanelError> {
        let _guard = self.begin()?;

        self.set_activity(Activity::Loading(Loading::Saving)).await;
        let response = self.gateway.push_device_state(&state).await;
        self.confirm_saved(response).await?;

        self.refresh(Loading::Downloading).await?;
        self.settle(|state| state.view = ViewState::ShowingStatus).await;

        Ok(())
    }

    pub async fn submit_rule_list_edit(&self, rules: Vec<Rule>) -> Result<(), PanelError> {
        let _guard = self.begin()?;

        self.set_activity(Activity::Loading(Loading::Saving)).await;
        let response = self.gateway.push_rules(&rules).await;
        self.confirm_saved(response).await?;

        self.refresh(Loading::Downloading).await?;
        self.settle(|state| state.view = ViewState::ListingRules).await;

        Ok(())
    }

    /// Saves the selected rule, or deletes it when `rule` is `None`.
    pub async fn submit_rule_edit(&self, rule: Option<Rule>) -> Result<(), PanelError> {
        let _guard = self.begin()?;

        let edit = {
            let state = self.state.read().await;
            let rules = state.snapshot.as_ref().map(|snapshot| snapshot.rules.as_slice()).unwrap_or(&[]);
            apply_rule_edit(rules, state.active_rule, rule)
        };

        if let Some(rules) = edit.rules() {
            self.set_activity(Activity::Loading(Loading::Saving)).await;
            let response = self.gateway.push_rules(rules).await;
            self.confirm_saved(response).await?;
        }

        self.refresh(Loading::Downloading).await?;
        self.settle(|state| {
            let rule_count = state.rule_count();
            match edit {
                RuleEdit::Unchanged => {
                    state.view = ViewState::ListingRules;
                }
                RuleEdit::Deleted { index, .. } => {
                    state.active_rule = index
                        .checked_sub(1)
                        .and_then(|previous| clamp_selection(Some(previous), rule_count));
                    state.view = ViewState::ListingRules;
                }
                RuleEdit::Appended { index, .. } | RuleEdit::Replaced { index, .. } => {
                    state.active_rule = clamp_selection(Some(index), rule_count);
                }
            }
        })
        .await;

        Ok(())
    }

    pub async fn dispatch(&self, intent: Intent) -> Result<(), PanelError> {
        tracing::debug!(?intent, "dispatching");

        match intent {
            Intent::Navigate(view) => self.go_to(view).await,
            Intent::SelectRule(index) => self.select_rule(index).await,
            Intent::SubmitDeviceState(state) => self.submit_device_state(state).await,
            Intent::SubmitRules(rules) => self.submit_rule_list_edit(rules).await,
            Intent::SubmitRule(rule) => self.submit_rule_edit(rule).await,
            Intent::Cancel => self.cancel().await,
        }
    }

    /// Builds the presentation of the current state. A login request wins over
    /// any other error, errors win over loading.
    pub async fn screen(&self) -> Screen {
        let state = self.state.read().await;

        match (&state.activity, &state.snapshot) {
            (Activity::Failed(error), _) if error.is_unauthenticated() => Screen::LoginRequired {
                login_url: self.login_url.clone(),
            },
            (Activity::Failed(error), _) => Screen::Error(error.to_string()),
            (Activity::Loading(loading), _) => Screen::Loading(loading.to_string()),
            (Activity::Ready, None) => Screen::Loading(Loading::Initializing.to_string()),
            (Activity::Ready, Some(snapshot)) => match state.view {
                ViewState::ShowingStatus => {
                    Screen::Status(StatusView::new(snapshot, self.codec.datetime()))
                }
                ViewState::EditingStatus => Screen::StatusEdit(StatusEditView::new(snapshot)),
                ViewState::ListingRules => Screen::RuleList(RuleListView::new(
                    snapshot,
                    state.active_rule,
                    self.codec.datetime(),
                )),
                ViewState::EditingRule => {
                    Screen::RuleEdit(RuleEditView::new(snapshot, state.active_rule, &self.codec))
                }
            },
        }
    }

    async fn navigate(&self, view: ViewState) -> Result<(), PanelError> {
        self.refresh(Loading::Downloading).await?;
        self.settle(|state| state.view = view).await;

        Ok(())
    }

    async fn set_activity(&self, activity: Activity) {
        self.state.write().await.activity = activity;
    }

    async fn settle(&self, apply: impl FnOnce(&mut PanelState)) {
        let mut state = self.state.write().await;
        apply(&mut *state);
        state.activity = Activity::Ready;
    }

    async fn confirm_saved(&self, response: ApiResponse) -> Result<(), PanelError> {
        if let Err(e) = response.check() {
            let error = PanelError::Save(e);
            tracing::warn!("{}", error);
            self.set_activity(Activity::Failed(error.clone())).await;
            return Err(error);
        }

        tracing::debug!(status_code = ?response.status_code, "changes saved");
        Ok(())
    }

    /// Pulls a fresh snapshot and re-validates the selection against it.
    async fn refresh(&self, loading: Loading) -> Result<(), PanelError> {
        self.set_activity(Activity::Loading(loading)).await;

        let envelope = self.gateway.fetch_state().await;
        let (response, status) = match envelope.into_result() {
            Ok(result) => result,
            Err(e) => {
                let error = PanelError::Load(e);
                tracing::warn!("{}", error);
                self.set_activity(Activity::Failed(error.clone())).await;
                return Err(error);
            }
        };

        let snapshot = SystemSnapshot::new(response, status);
        let mut state = self.state.write().await;
        let rule_count = snapshot.rules.len();
        let selection = if state.first_load { None } else { state.active_rule };
        state.active_rule = clamp_selection(selection, rule_count);
        state.first_load = false;

        tracing::debug!(
            devices = snapshot.devices.len(),
            rules = rule_count,
            "snapshot refreshed"
        );
        state.snapshot = Some(snapshot);

        Ok(())
    }
}
