use crate::category::Category;
use crate::category::CategorySet;
use crate::config::OverlayLabels;
use crate::config::TimingConfig;
use crate::host::HostDocument;
use crate::runtime::Scheduler;
use codex_async_utils::poll_until;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    Found(CategorySet),
    /// The popover never showed up with any environment in it.
    TimedOut,
    /// There was no disclosure control to open the popover with.
    Absent,
}

/// Reads the environment vocabulary out of the host's transient popover and
/// forwards selections back into it.
#[derive(Debug, Clone)]
pub struct EntityDiscovery {
    labels: OverlayLabels,
    timing: TimingConfig,
}

impl EntityDiscovery {
    pub fn new(labels: OverlayLabels, timing: TimingConfig) -> Self {
        Self { labels, timing }
    }

    /// An overlay is the environment popover only if some element inside it
    /// reads exactly like the section marker.
    pub fn is_category_overlay<D: HostDocument>(&self, doc: &D, overlay: &D::Node) -> bool {
        doc.subtree_texts(overlay)
            .iter()
            .any(|text| self.labels.is_section_marker(text))
    }

    pub fn extract_categories<D: HostDocument>(&self, doc: &D, overlay: &D::Node) -> CategorySet {
        if !self.is_category_overlay(doc, overlay) {
            return CategorySet::new();
        }
        doc.controls_within(overlay)
            .iter()
            .filter_map(|control| {
                let label = doc.text(control);
                let label = label.trim();
                if self.labels.is_excluded_caption(label) {
                    return None;
                }
                Category::from_label(label)
            })
            .collect()
    }

    /// First attached overlay that is the environment popover and lists at
    /// least one environment.
    pub fn find_category_overlay<D: HostDocument>(
        &self,
        doc: &D,
    ) -> Option<(D::Node, CategorySet)> {
        doc.overlays().into_iter().find_map(|overlay| {
            let categories = self.extract_categories(doc, &overlay);
            (!categories.is_empty()).then_some((overlay, categories))
        })
    }

    pub async fn wait_for_overlay<D: HostDocument>(
        &self,
        doc: &D,
        scheduler: &dyn Scheduler,
        timeout: Duration,
    ) -> Option<(D::Node, CategorySet)> {
        poll_until(
            || self.find_category_overlay(doc),
            |duration| scheduler.sleep(duration),
            self.timing.poll_interval(),
            timeout,
        )
        .await
        .ok()
    }

    /// Makes sure the popover is open or opening. Returns `false` only when
    /// the host has no disclosure control to click.
    pub async fn open_if_closed<D: HostDocument>(
        &self,
        doc: &D,
        scheduler: &dyn Scheduler,
    ) -> bool {
        let Some(control) = doc.disclosure_control() else {
            debug!("environment disclosure control not found");
            return false;
        };
        if self
            .wait_for_overlay(doc, scheduler, self.timing.probe_timeout())
            .await
            .is_some()
        {
            return true;
        }
        doc.activate(&control);
        true
    }

    pub async fn discover<D: HostDocument>(
        &self,
        doc: &D,
        scheduler: &dyn Scheduler,
        open_if_closed: bool,
        timeout: Duration,
    ) -> DiscoveryOutcome {
        if open_if_closed && !self.open_if_closed(doc, scheduler).await {
            return DiscoveryOutcome::Absent;
        }
        match self.wait_for_overlay(doc, scheduler, timeout).await {
            Some((_, categories)) => {
                debug!(count = categories.len(), "discovered environments");
                DiscoveryOutcome::Found(categories)
            }
            None => {
                debug!(?timeout, "environment popover did not appear");
                DiscoveryOutcome::TimedOut
            }
        }
    }

    /// Opens the popover and clicks the control labelled exactly `category`,
    /// so the host's own notion of the current environment follows ours.
    /// Returns whether a control was activated.
    pub async fn mirror_selection<D: HostDocument>(
        &self,
        doc: &D,
        scheduler: &dyn Scheduler,
        category: &Category,
    ) -> bool {
        if !self.open_if_closed(doc, scheduler).await {
            return false;
        }
        let Some((overlay, _)) = self
            .wait_for_overlay(doc, scheduler, self.timing.discovery_timeout())
            .await
        else {
            debug!(%category, "popover did not open; selection not mirrored");
            return false;
        };
        let target = doc
            .controls_within(&overlay)
            .into_iter()
            .find(|control| doc.text(control).trim() == category.as_str());
        match target {
            Some(control) => {
                doc.activate(&control);
                true
            }
            None => {
                debug!(%category, "no popover control matches selection");
                false
            }
        }
    }
}
