//! Project search and grouping by parent

use crate::api::{Project, ResourceManager};
use crate::errors::Result;
use std::collections::HashMap;
use std::fmt;

/// How much of the search result set to fetch
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Search query passed to `projects.search`
    pub query: Option<String>,
    /// Follow page tokens instead of stopping after the first response
    pub all_pages: bool,
}

/// Active project names for one parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectGroup {
    pub parent: String,
    pub projects: Vec<String>,
}

/// Active projects grouped by parent, in order of first discovery
#[derive(Debug, Clone, Default)]
pub struct ProjectGroups {
    groups: Vec<ProjectGroup>,
    index: HashMap<String, usize>,
}

impl ProjectGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a project name under `parent`
    pub fn insert(&mut self, parent: &str, project: &str) {
        let slot = match self.index.get(parent) {
            Some(&slot) => slot,
            None => {
                self.groups.push(ProjectGroup {
                    parent: parent.to_string(),
                    projects: Vec::new(),
                });
                self.index.insert(parent.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[slot].projects.push(project.to_string());
    }

    pub fn groups(&self) -> &[ProjectGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of grouped projects
    pub fn project_count(&self) -> usize {
        self.groups.iter().map(|g| g.projects.len()).sum()
    }
}

/// Group active projects by parent; every other state is skipped
pub fn group_active_projects<'a, I>(projects: I) -> ProjectGroups
where
    I: IntoIterator<Item = &'a Project>,
{
    let mut groups = ProjectGroups::new();
    for project in projects {
        if project.is_active() {
            groups.insert(&project.parent, &project.name);
        } else {
            tracing::debug!(project = %project.name, state = %project.state, "skipping inactive project");
        }
    }
    groups
}

/// Run the search call(s) and collect the returned projects
pub async fn search_projects<A>(api: &A, options: &SearchOptions) -> Result<Vec<Project>>
where
    A: ResourceManager + ?Sized,
{
    let mut projects = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = api
            .search_projects(options.query.as_deref(), page_token.as_deref())
            .await?;
        projects.extend(page.projects.iter().cloned());

        match page.next_page() {
            Some(token) if options.all_pages => page_token = Some(token.to_string()),
            Some(_) => {
                tracing::info!("more projects available; pass --all-pages to fetch them");
                break;
            }
            None => break,
        }
    }

    Ok(projects)
}

/// Search, filter to active, and group in one step
pub async fn active_projects_by_parent<A>(api: &A, options: &SearchOptions) -> Result<ProjectGroups>
where
    A: ResourceManager + ?Sized,
{
    let projects = search_projects(api, options).await?;
    let groups = group_active_projects(&projects);
    if groups.is_empty() {
        tracing::info!(found = projects.len(), "no active projects found");
        return Ok(groups);
    }
    tracing::info!(
        found = projects.len(),
        active = groups.project_count(),
        parents = groups.groups().len(),
        "project search complete"
    );
    Ok(groups)
}

impl fmt::Display for ProjectGroups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in &self.groups {
            writeln!(f, "Parent: {}", group.parent)?;
            for project in &group.projects {
                writeln!(f, "  Project: {}", project)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
