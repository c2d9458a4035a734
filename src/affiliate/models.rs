use crate::bulk::{Selectable, ViewFilter};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutreachStatus {
    #[default]
    New,
    Contacted,
    Replied,
    Declined,
}

impl fmt::Display for OutreachStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OutreachStatus::New => "new",
            OutreachStatus::Contacted => "contacted",
            OutreachStatus::Replied => "replied",
            OutreachStatus::Declined => "declined",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAffiliate {
    pub id: u64,
    pub link: String,
    pub domain: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: OutreachStatus,
    #[serde(default)]
    pub outreach_message: Option<String>,
}

impl SavedAffiliate {
    pub fn has_email(&self) -> bool {
        self.email.as_deref().is_some_and(|email| !email.trim().is_empty())
    }

    pub fn has_message(&self) -> bool {
        self.outreach_message
            .as_deref()
            .is_some_and(|message| !message.trim().is_empty())
    }

    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.domain)
    }

    fn matches_query(&self, query_lower: &str) -> bool {
        let fields = [
            Some(self.domain.as_str()),
            Some(self.link.as_str()),
            self.title.as_deref(),
            self.email.as_deref(),
        ];
        fields
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(query_lower))
    }
}

impl Selectable for SavedAffiliate {
    type Id = u64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineView {
    #[default]
    All,
    NeedsEmail,
    HasEmail,
    Contacted,
}

impl PipelineView {
    pub const ALL: [PipelineView; 4] = [
        PipelineView::All,
        PipelineView::NeedsEmail,
        PipelineView::HasEmail,
        PipelineView::Contacted,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            PipelineView::All => "All",
            PipelineView::NeedsEmail => "Needs email",
            PipelineView::HasEmail => "Has email",
            PipelineView::Contacted => "Contacted",
        }
    }

    pub fn next(&self) -> Self {
        let index = Self::ALL.iter().position(|view| view == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        let index = Self::ALL.iter().position(|view| view == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn matches(&self, affiliate: &SavedAffiliate) -> bool {
        match self {
            PipelineView::All => true,
            PipelineView::NeedsEmail => !affiliate.has_email(),
            PipelineView::HasEmail => affiliate.has_email(),
            PipelineView::Contacted => affiliate.status != OutreachStatus::New,
        }
    }
}

/// Active tab plus the search box.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineFilter {
    pub view: PipelineView,
    pub query: String,
}

#[cfg(test)]
impl PipelineFilter {
    fn new(view: PipelineView, query: impl Into<String>) -> Self {
        Self {
            view,
            query: query.into(),
        }
    }
}

impl ViewFilter<SavedAffiliate> for PipelineFilter {
    fn matches(&self, item: &SavedAffiliate) -> bool {
        if !self.view.matches(item) {
            return false;
        }

        let query = self.query.trim();
        query.is_empty() || item.matches_query(&query.to_lowercase())
    }
}

#[cfg(test)]
pub(crate) fn affiliate(id: u64, domain: &str, email: Option<&str>) -> SavedAffiliate {
    SavedAffiliate {
        id,
        link: format!("https://{}/partners", domain),
        domain: domain.to_string(),
        title: None,
        email: email.map(str::to_string),
        status: OutreachStatus::New,
        outreach_message: None,
    }
}
