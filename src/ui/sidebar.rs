//! Cascade node sidebar.
//!
//! Three collapsible sections (models, transform, export). The sidebar is
//! described as plain data; the host toolkit draws it and routes header clicks
//! back as [`Message::SectionToggled`].

use crate::constants::MANAGE_MODELS_LABEL;
use crate::message::Message;
use crate::model::{NodeCategory, TrainingProject};

/// Expanded/collapsed flag for one section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollapsibleState {
    pub is_expanded: bool,
}

impl CollapsibleState {
    pub fn new(expanded: bool) -> Self {
        Self {
            is_expanded: expanded,
        }
    }

    pub fn collapsed() -> Self {
        Self::new(false)
    }

    pub fn toggle(&mut self) {
        self.is_expanded = !self.is_expanded;
    }
}

/// Open/closed flags for the three sidebar sections. All start closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SidebarState {
    pub models: CollapsibleState,
    pub transform: CollapsibleState,
    pub export: CollapsibleState,
}

impl SidebarState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(&self, category: NodeCategory) -> CollapsibleState {
        match category {
            NodeCategory::Model => self.models,
            NodeCategory::Transform => self.transform,
            NodeCategory::Export => self.export,
        }
    }

    fn section_mut(&mut self, category: NodeCategory) -> &mut CollapsibleState {
        match category {
            NodeCategory::Model => &mut self.models,
            NodeCategory::Transform => &mut self.transform,
            NodeCategory::Export => &mut self.export,
        }
    }

    /// Flip one section's flag, leaving the others alone.
    pub fn toggle(&mut self, category: NodeCategory) {
        let section = self.section_mut(category);
        section.toggle();
        log::debug!(
            "Sidebar section '{}' {}",
            category.title(),
            if section.is_expanded { "opened" } else { "closed" }
        );
    }

    pub fn is_open(&self, category: NodeCategory) -> bool {
        self.section(category).is_expanded
    }
}

/// Header chevron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chevron {
    Down,
    Up,
}

impl Chevron {
    /// Icon name in the host icon font.
    pub fn icon_name(&self) -> &'static str {
        match self {
            Chevron::Down => "ChevronDown",
            Chevron::Up => "ChevronUp",
        }
    }
}

/// One draggable model entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCard {
    pub project_id: u64,
    pub name: String,
    pub is_trained: bool,
}

impl From<&TrainingProject> for ModelCard {
    fn from(project: &TrainingProject) -> Self {
        Self {
            project_id: project.id,
            name: project.name.clone(),
            is_trained: project.is_trained,
        }
    }
}

/// Body of an open section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionContent {
    /// Model cards followed by a "Manage Models" link.
    Models {
        cards: Vec<ModelCard>,
        manage_link: &'static str,
    },
    /// Slot for the host's transform node palette.
    TransformPanel,
    /// Slot for the host's export node palette.
    ExportPanel,
}

/// One collapsible section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionView {
    pub category: NodeCategory,
    pub title: &'static str,
    pub chevron: Chevron,
    /// Message to send when the header is clicked.
    pub on_toggle: Message,
    /// `None` when collapsed.
    pub content: Option<SectionContent>,
}

impl SectionView {
    pub fn is_expanded(&self) -> bool {
        self.content.is_some()
    }
}

/// The whole sidebar, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct SidebarView {
    pub sections: Vec<SectionView>,
}

impl SidebarView {
    pub fn section(&self, category: NodeCategory) -> Option<&SectionView> {
        self.sections.iter().find(|s| s.category == category)
    }
}

/// Build the sidebar for the current state and model list.
pub fn build_sidebar(state: &SidebarState, models: &[TrainingProject]) -> SidebarView {
    let sections = NodeCategory::all()
        .iter()
        .map(|&category| {
            let expanded = state.is_open(category);
            let content = expanded.then(|| match category {
                NodeCategory::Model => SectionContent::Models {
                    cards: models.iter().map(ModelCard::from).collect(),
                    manage_link: MANAGE_MODELS_LABEL,
                },
                NodeCategory::Transform => SectionContent::TransformPanel,
                NodeCategory::Export => SectionContent::ExportPanel,
            });

            SectionView {
                category,
                title: category.title(),
                chevron: if expanded { Chevron::Down } else { Chevron::Up },
                on_toggle: Message::SectionToggled(category),
                content,
            }
        })
        .collect();

    SidebarView { sections }
}
