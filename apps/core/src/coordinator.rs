use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::announcer::{
    Announcement, StatusAnnouncer, StatusMessage, StatusOutputs, DEFAULT_ANNOUNCE_DELAY,
};
use crate::config::Config;
use crate::contract::FilterReport;
use crate::model::{is_blank_query, Entry};
use crate::page::{EntryContainer, FilterForm, Page, SearchInput, DEFAULT_FILTER_ATTRIBUTE};
use crate::registry::{self, EntrySet, InitError, OutputChannel};
use crate::search::{match_entries, MatchResult};
use crate::timer::{Clock, SystemClock};
use crate::visibility::apply_visibility;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub filter_attribute: String,
    pub announce_delay: Duration,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            filter_attribute: DEFAULT_FILTER_ATTRIBUTE.to_string(),
            announce_delay: DEFAULT_ANNOUNCE_DELAY,
        }
    }
}

impl From<&Config> for FilterOptions {
    fn from(config: &Config) -> Self {
        Self {
            filter_attribute: config.filter_attribute.clone(),
            announce_delay: Duration::from_millis(config.announce_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Uninitialized,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Ignored,
    Applied(MatchResult),
}

#[derive(Debug)]
struct Bindings {
    form_hidden: bool,
    input: SearchInput,
    outputs: StatusOutputs,
    container: EntryContainer,
}

impl Bindings {
    fn capture(page: Page) -> Result<Self, (Page, InitError)> {
        let Page { form, container } = page;
        let (form, container) = match (form, container) {
            (Some(form), Some(container)) => (form, container),
            (form, None) => return Err((Page { form, container: None }, InitError::NoContainer)),
            (None, container) => return Err((Page { form: None, container }, InitError::NoInput)),
        };

        let FilterForm {
            hidden,
            input,
            status,
            polite_region,
            alert_region,
        } = form;

        match (input, status, polite_region, alert_region) {
            (Some(input), Some(status), Some(polite), Some(alert)) => Ok(Self {
                form_hidden: hidden,
                input,
                outputs: StatusOutputs {
                    status,
                    polite,
                    alert,
                },
                container,
            }),
            (input, status, polite_region, alert_region) => {
                let error = if input.is_none() {
                    InitError::NoInput
                } else if status.is_none() {
                    InitError::MissingOutputChannel(OutputChannel::Status)
                } else if polite_region.is_none() {
                    InitError::MissingOutputChannel(OutputChannel::Polite)
                } else {
                    InitError::MissingOutputChannel(OutputChannel::Alert)
                };
                let form = FilterForm {
                    hidden,
                    input,
                    status,
                    polite_region,
                    alert_region,
                };
                Err((
                    Page {
                        form: Some(form),
                        container: Some(container),
                    },
                    error,
                ))
            }
        }
    }

    fn into_page(self) -> Page {
        Page {
            form: Some(FilterForm {
                hidden: self.form_hidden,
                input: Some(self.input),
                status: Some(self.outputs.status),
                polite_region: Some(self.outputs.polite),
                alert_region: Some(self.outputs.alert),
            }),
            container: Some(self.container),
        }
    }
}

#[derive(Debug)]
struct ActiveFilter {
    bindings: Bindings,
    entries: EntrySet,
    query: String,
    announcer: StatusAnnouncer,
    last_result: MatchResult,
}

#[derive(Debug)]
enum Inner {
    Uninitialized { page: Page, error: InitError },
    Active(Box<ActiveFilter>),
}

#[derive(Debug)]
pub struct FilterCoordinator<C: Clock = SystemClock> {
    clock: C,
    inner: Inner,
}

impl<C: Clock> FilterCoordinator<C> {
    /// Binds to `page`. On any [`InitError`] the form is hidden and the
    /// coordinator stays uninitialized; otherwise the pipeline runs once with
    /// whatever the input already holds.
    pub fn new(page: Page, options: &FilterOptions, clock: C) -> Self {
        match bind(page, options) {
            Ok(mut active) => {
                let now = clock.now();
                info!(
                    entries = active.entries.len(),
                    attribute = %options.filter_attribute,
                    delay_ms = options.announce_delay.as_millis() as u64,
                    "filter active"
                );
                active.run_pipeline(now);
                Self {
                    clock,
                    inner: Inner::Active(Box::new(active)),
                }
            }
            Err((mut page, init_error)) => {
                error!(error = %init_error, "filter disabled; hiding filter form");
                page.hide_form();
                Self {
                    clock,
                    inner: Inner::Uninitialized {
                        page,
                        error: init_error,
                    },
                }
            }
        }
    }

    pub fn state(&self) -> CoordinatorState {
        match self.inner {
            Inner::Uninitialized { .. } => CoordinatorState::Uninitialized,
            Inner::Active(_) => CoordinatorState::Active,
        }
    }

    pub fn init_error(&self) -> Option<&InitError> {
        match &self.inner {
            Inner::Uninitialized { error, .. } => Some(error),
            Inner::Active(_) => None,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn on_input(&mut self, value: &str) -> InputOutcome {
        let now = self.clock.now();
        let Inner::Active(active) = &mut self.inner else {
            return InputOutcome::Ignored;
        };

        active.bindings.input.value.clear();
        active.bindings.input.value.push_str(value);
        active.query.clear();
        active.query.push_str(value);
        InputOutcome::Applied(active.run_pipeline(now))
    }

    pub fn submit(&mut self) -> InputOutcome {
        let now = self.clock.now();
        let Inner::Active(active) = &mut self.inner else {
            return InputOutcome::Ignored;
        };

        debug!(query = %active.query, "filter form submitted");
        InputOutcome::Applied(active.run_pipeline(now))
    }

    pub fn poll(&mut self) -> Option<Announcement> {
        let now = self.clock.now();
        let Inner::Active(active) = &mut self.inner else {
            return None;
        };
        active.announcer.poll(now, &mut active.bindings.outputs)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.active().and_then(|active| active.announcer.next_deadline())
    }

    pub fn query(&self) -> Option<&str> {
        self.active().map(|active| active.query.as_str())
    }

    pub fn last_result(&self) -> Option<MatchResult> {
        self.active().map(|active| active.last_result)
    }

    pub fn entries(&self) -> Option<&EntrySet> {
        self.active().map(|active| &active.entries)
    }

    pub fn outputs(&self) -> Option<&StatusOutputs> {
        self.active().map(|active| &active.bindings.outputs)
    }

    pub fn first_visible(&self) -> Option<&Entry> {
        self.active().and_then(|active| active.entries.first_visible())
    }

    pub fn snapshot(&self) -> FilterReport {
        match &self.inner {
            Inner::Uninitialized { error, .. } => FilterReport::uninitialized(error),
            Inner::Active(active) => FilterReport {
                active: true,
                init_error: None,
                query: active.query.clone(),
                matched_count: active.last_result.matched_count,
                total_count: active.last_result.total_count,
                status_text: active.bindings.outputs.status.text().to_string(),
                polite_region: active.bindings.outputs.polite.text().to_string(),
                alert_region: active.bindings.outputs.alert.text().to_string(),
                announcement_pending: active.announcer.next_deadline().is_some(),
                visible: active
                    .entries
                    .iter()
                    .filter(|entry| entry.is_visible())
                    .map(|entry| entry.label().to_string())
                    .collect(),
            },
        }
    }

    pub fn into_page(self) -> Page {
        match self.inner {
            Inner::Uninitialized { page, .. } => page,
            Inner::Active(active) => active.bindings.into_page(),
        }
    }

    fn active(&self) -> Option<&ActiveFilter> {
        match &self.inner {
            Inner::Active(active) => Some(active.as_ref()),
            Inner::Uninitialized { .. } => None,
        }
    }
}

impl ActiveFilter {
    fn run_pipeline(&mut self, now: Instant) -> MatchResult {
        let matched = match_entries(&self.query, &self.entries);
        let change = apply_visibility(&mut self.entries, &mut self.bindings.container, &matched.ids);
        debug!(
            matched = matched.result.matched_count,
            total = matched.result.total_count,
            shown = change.shown,
            hidden = change.hidden,
            "filter applied"
        );

        let message = StatusMessage::describe(is_blank_query(&self.query), matched.result);
        self.announcer.update(message, now, &mut self.bindings.outputs);
        self.last_result = matched.result;
        matched.result
    }
}

fn bind(page: Page, options: &FilterOptions) -> Result<ActiveFilter, (Page, InitError)> {
    let entries = match registry::initialize(page.container.as_ref(), &options.filter_attribute) {
        Ok(entries) => entries,
        Err(error) => return Err((page, error)),
    };
    let bindings = Bindings::capture(page)?;
    let query = bindings.input.value.clone();

    Ok(ActiveFilter {
        bindings,
        entries,
        query,
        announcer: StatusAnnouncer::new(options.announce_delay),
        last_result: MatchResult::default(),
    })
}
