//! HTML rendering.
//!
//! Turns resolved views into complete HTML documents using the layouts of a
//! [`TemplateSet`]. Markup is written with [maud](https://maud.lambda.xyz/),
//! so every piece of data from the export is escaped on the way out.
//!
//! ## Pages
//!
//! - **Entity page** (`<id>.html`): header with name, kind and status, then
//!   the layout's sections in order
//! - **Index page** (`index.html`): every entity, grouped by kind
//! - **Kind page** (`kinds/<kind>.html`): every entity of one kind
//!
//! ## Rendering Never Fails
//!
//! A template may ask for anything. Whatever is not there (an absent
//! component, a field of the wrong shape, a hop through a dangling reference)
//! renders as the configured missing text. A reference to an ID that is not
//! in the dataset renders as an "unresolved" marker showing that ID.
//!
//! All links are relative, so the output works from any directory and any
//! static file server.

use crate::config::{self, WikiConfig};
use crate::naming::{kind_label, kind_slug, page_filename};
use crate::resolve::{Resolution, ResolvedView, Value, ViewRef};
use crate::store::EntityId;
use crate::template::{
    BacklinksSection, ComponentsSection, FieldPath, FieldsSection, ListSection, Lookup,
    PageTemplate, Section, TemplateSet,
};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Slug of the group of entities that have no kind.
pub const OTHER_SLUG: &str = "_other";

/// Entities of one kind, in input order.
#[derive(Debug, Clone)]
pub struct KindGroup<'a> {
    /// File stem of the kind page; [`OTHER_SLUG`] for entities with no kind.
    pub slug: String,
    /// The kind as first seen in the data.
    pub kind: Option<&'a str>,
    pub members: Vec<ViewRef<'a>>,
}

/// Group entities by kind.
///
/// Kinds listed in `kinds` come first, in that order; other kinds follow in
/// order of first appearance; entities with no kind come last. Kinds whose
/// slugs coincide share a group.
pub fn group_by_kind<'a>(resolution: &'a Resolution, kinds: &[String]) -> Vec<KindGroup<'a>> {
    let mut groups: Vec<KindGroup<'a>> = Vec::new();
    let mut other = Vec::new();

    for view in resolution.views() {
        let kind = view.view().kind.as_deref();
        let slug = kind.map(kind_slug).unwrap_or_default();
        if slug.is_empty() {
            other.push(view);
            continue;
        }
        match groups.iter_mut().find(|g| g.slug == slug) {
            Some(group) => group.members.push(view),
            None => groups.push(KindGroup {
                slug,
                kind,
                members: vec![view],
            }),
        }
    }

    let rank = |group: &KindGroup<'_>| {
        kinds
            .iter()
            .position(|k| kind_slug(k) == group.slug)
            .unwrap_or(kinds.len())
    };
    groups.sort_by_key(rank);

    if !other.is_empty() {
        groups.push(KindGroup {
            slug: OTHER_SLUG.to_string(),
            kind: None,
            members: other,
        });
    }
    groups
}

/// Renders pages from a template set and the wiki config.
#[derive(Debug, Clone)]
pub struct Renderer {
    config: WikiConfig,
    templates: TemplateSet,
    css: String,
}

/// Per-page rendering state.
struct Ctx<'a> {
    resolution: &'a Resolution,
    missing: &'a str,
    /// Prefix from the page's directory back to the output root.
    root: &'a str,
}

impl Renderer {
    pub fn new(config: WikiConfig, templates: TemplateSet) -> Self {
        let color_css = config::generate_color_css(&config.colors);
        let css = format!("{}\n\n{}", color_css, CSS_STATIC);
        Self {
            config,
            templates,
            css,
        }
    }

    pub fn config(&self) -> &WikiConfig {
        &self.config
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// Template name for an entity: its kind slug if a layout exists for it,
    /// otherwise `fallback`.
    pub fn template_for(&self, view: &ResolvedView) -> String {
        self.templates.name_for_kind(view.kind.as_deref())
    }

    /// Render an entity page with the named template. Unknown names use the
    /// fallback layout.
    pub fn render(&self, view: ViewRef<'_>, template_name: &str) -> String {
        let template = self
            .templates
            .page(template_name)
            .unwrap_or_else(|| self.templates.fallback());
        let ctx = Ctx {
            resolution: view.resolution(),
            missing: &self.config.missing_text,
            root: "",
        };
        let kind = view.kind.as_deref();
        let label = template
            .label
            .clone()
            .or_else(|| kind.map(kind_label));

        let breadcrumb = html! {
            a href="index.html" { (self.config.site_title) }
            @if let Some(kind) = kind.filter(|k| !kind_slug(k).is_empty()) {
                span.sep { "›" }
                @if self.templates.index().kind_pages {
                    a href=(format!("kinds/{}.html", kind_slug(kind))) { (self.group_heading(Some(kind))) }
                } @else {
                    span { (self.group_heading(Some(kind))) }
                }
            }
            span.sep { "›" }
            span { (view.name) }
        };

        let content = html! {
            (site_header(breadcrumb, home_nav(&ctx)))
            main.entity-page {
                header.entity-header {
                    h1 { (view.name) }
                    p.entity-meta {
                        @if let Some(label) = &label {
                            span.kind { (label) }
                        }
                        @match view.active {
                            Some(true) => { span.status-active { "Active" } },
                            Some(false) => { span.status-inactive { "Inactive" } },
                            None => {},
                        }
                        span.entity-id { "#" (view.id.as_str()) }
                    }
                }
                @for section in &template.sections {
                    (render_section(&ctx, view, section))
                }
            }
            (site_footer(&ctx, &self.config.site_title))
        };

        let title = format!("{} - {}", view.name, self.config.site_title);
        base_document(&title, &self.css, Some("entity"), content).into_string()
    }

    /// Render an entity page with the template chosen by [`Self::template_for`].
    pub fn render_entity(&self, view: ViewRef<'_>) -> String {
        self.render(view, &self.template_for(&view))
    }

    /// The home page: title, intro and every group.
    pub fn render_index(&self, resolution: &Resolution, groups: &[KindGroup<'_>]) -> String {
        let index = self.templates.index();
        let title = index.title.as_deref().unwrap_or(&self.config.site_title);
        let ctx = Ctx {
            resolution,
            missing: &self.config.missing_text,
            root: "",
        };

        let breadcrumb = html! {
            span { (title) }
        };
        let content = html! {
            (site_header(breadcrumb, html! {}))
            main.index-page {
                h1 { (title) }
                @if let Some(intro) = &index.intro {
                    div.intro { (markdown(intro)) }
                }
                @if groups.is_empty() {
                    p.missing { "No entities." }
                }
                @for group in groups {
                    section.block.kind-group {
                        h2 {
                            @if index.kind_pages {
                                a href=(format!("kinds/{}.html", group.slug)) { (self.group_heading(group.kind)) }
                            } @else {
                                (self.group_heading(group.kind))
                            }
                            " "
                            span.count { "(" (group.members.len()) ")" }
                        }
                        (member_list(&ctx, &group.members))
                    }
                }
            }
            (site_footer(&ctx, &self.config.site_title))
        };

        base_document(title, &self.css, Some("index"), content).into_string()
    }

    /// The listing page of one kind, written to `kinds/<slug>.html`.
    pub fn render_kind_page(&self, resolution: &Resolution, group: &KindGroup<'_>) -> String {
        let ctx = Ctx {
            resolution,
            missing: &self.config.missing_text,
            root: "../",
        };
        let heading = self.group_heading(group.kind);

        let breadcrumb = html! {
            a href="../index.html" { (self.config.site_title) }
            span.sep { "›" }
            span { (heading) }
        };
        let content = html! {
            (site_header(breadcrumb, home_nav(&ctx)))
            main.kind-page {
                h1 { (heading) }
                (member_list(&ctx, &group.members))
            }
            (site_footer(&ctx, &self.config.site_title))
        };

        let title = format!("{} - {}", heading, self.config.site_title);
        base_document(&title, &self.css, Some("kind"), content).into_string()
    }

    /// Heading of a kind's group: the layout's plural, then its label, then
    /// the kind name spelled out. Entities with no kind are "Other".
    pub fn group_heading(&self, kind: Option<&str>) -> String {
        let Some(kind) = kind else {
            return "Other".to_string();
        };
        let layout: Option<&PageTemplate> = self.templates.page(&kind_slug(kind));
        layout
            .and_then(|t| t.plural.clone().or_else(|| t.label.clone()))
            .unwrap_or_else(|| kind_label(kind))
    }
}

// ============================================================================
// Document chrome
// ============================================================================

fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

/// Renders the site header with breadcrumb and navigation
fn site_header(breadcrumb: Markup, nav: Markup) -> Markup {
    html! {
        header.site-header {
            nav.breadcrumb {
                (breadcrumb)
            }
            nav.site-nav {
                (nav)
            }
        }
    }
}

fn home_nav(ctx: &Ctx<'_>) -> Markup {
    html! {
        a href=(format!("{}index.html", ctx.root)) { "All entities" }
    }
}

fn site_footer(ctx: &Ctx<'_>, site_title: &str) -> Markup {
    html! {
        footer.site-footer {
            a href=(format!("{}index.html", ctx.root)) { (site_title) }
        }
    }
}

fn markdown(text: &str) -> Markup {
    let parser = Parser::new(text);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);
    PreEscaped(body_html)
}

// ============================================================================
// Sections
// ============================================================================

fn render_section(ctx: &Ctx<'_>, view: ViewRef<'_>, section: &Section) -> Markup {
    match section {
        Section::Fields(fields) => render_fields(ctx, view, fields),
        Section::List(list) => render_list(ctx, view, list),
        Section::Components(components) => render_components(ctx, view, components),
        Section::Backlinks(backlinks) => render_backlinks(ctx, view, backlinks),
    }
}

fn render_fields(ctx: &Ctx<'_>, view: ViewRef<'_>, section: &FieldsSection) -> Markup {
    html! {
        section.block.fields {
            @if let Some(heading) = &section.heading {
                h2 { (heading) }
            }
            dl.fields {
                @for field in &section.fields {
                    dt { (field.label) }
                    dd { (render_results(ctx, &field.path.lookup_all_on(view))) }
                }
            }
        }
    }
}

fn render_list(ctx: &Ctx<'_>, view: ViewRef<'_>, section: &ListSection) -> Markup {
    let entries: Vec<_> = section
        .path
        .lookup_all_on(view)
        .into_iter()
        .flat_map(|found| list_entries(ctx.resolution, found))
        .collect();
    html! {
        section.block.list {
            h2 { (section.heading) }
            @if entries.is_empty() {
                p.missing { (section.empty.as_deref().unwrap_or(ctx.missing)) }
            } @else {
                ul.entries {
                    @for (head, tail) in &entries {
                        li {
                            (render_entry_head(ctx, *head, section.item.as_ref()))
                            @for detail in &section.details {
                                " "
                                span.details {
                                    @if !detail.label.is_empty() {
                                        (detail.label) ": "
                                    }
                                    (render_results(ctx, &detail.path.lookup_all(ctx.resolution, *tail)))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// `(head, tail)` per entry: the element twice for lists, key and value for
/// objects. A single non-list value is a one-entry list.
fn list_entries<'a>(resolution: &'a Resolution, lookup: Lookup<'a>) -> Vec<(Lookup<'a>, Lookup<'a>)> {
    match lookup {
        Lookup::Missing | Lookup::Value(Value::Null) => Vec::new(),
        Lookup::Value(Value::List(items)) => items
            .iter()
            .map(|item| {
                let entry = Lookup::of_value(resolution, item);
                (entry, entry)
            })
            .collect(),
        Lookup::Value(Value::Map(members)) => members
            .iter()
            .map(|(key, value)| {
                (
                    Lookup::of_key(resolution, key),
                    Lookup::of_value(resolution, value),
                )
            })
            .collect(),
        other => vec![(other, other)],
    }
}

fn render_entry_head(ctx: &Ctx<'_>, head: Lookup<'_>, item: Option<&FieldPath>) -> Markup {
    match head {
        Lookup::Entity(target) => {
            let label = item
                .map(|path| path.lookup(ctx.resolution, head))
                .and_then(plain_text)
                .unwrap_or_else(|| target.name.clone());
            entity_link(ctx, &target.id, &label)
        }
        other => render_lookup(ctx, other),
    }
}

fn render_components(ctx: &Ctx<'_>, view: ViewRef<'_>, section: &ComponentsSection) -> Markup {
    let shown: Vec<_> = view
        .components
        .iter()
        .filter(|c| !section.exclude.contains(&c.name))
        .collect();
    // Components without fields are markers ("Active", "Alive"); list them
    // on one line.
    let (tags, bodies): (Vec<_>, Vec<_>) = shown
        .into_iter()
        .partition(|c| matches!(&c.data, Value::Map(m) if m.is_empty()));

    html! {
        section.block.components {
            @if let Some(heading) = &section.heading {
                h2 { (heading) }
            }
            @if tags.is_empty() && bodies.is_empty() {
                p.missing { (ctx.missing) }
            }
            @if !tags.is_empty() {
                p.tags {
                    "Tags: "
                    (tags.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", "))
                }
            }
            @for component in &bodies {
                div.component {
                    h3 { (component.name) }
                    (render_value(ctx, &component.data))
                }
            }
        }
    }
}

fn render_backlinks(ctx: &Ctx<'_>, view: ViewRef<'_>, section: &BacklinksSection) -> Markup {
    let referrers: Vec<ViewRef<'_>> = view.backlinks().collect();
    html! {
        section.block.backlinks {
            h2 { (section.heading) }
            @if referrers.is_empty() {
                p.missing { (section.empty.as_deref().unwrap_or(ctx.missing)) }
            } @else {
                ul.entries {
                    @for referrer in &referrers {
                        li { (entity_link(ctx, &referrer.id, &referrer.name)) }
                    }
                }
            }
        }
    }
}

fn member_list(ctx: &Ctx<'_>, members: &[ViewRef<'_>]) -> Markup {
    html! {
        ul.entries {
            @for member in members {
                li {
                    (entity_link(ctx, &member.id, &member.name))
                    @if member.active == Some(false) {
                        " "
                        span.inactive { "(inactive)" }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Values
// ============================================================================

fn render_lookup(ctx: &Ctx<'_>, lookup: Lookup<'_>) -> Markup {
    match lookup {
        Lookup::Missing => missing(ctx),
        Lookup::Entity(target) => entity_link(ctx, &target.id, &target.name),
        Lookup::Unresolved(id) => unresolved(id),
        Lookup::Value(value) => render_value(ctx, value),
        Lookup::Text("") => missing(ctx),
        Lookup::Text(text) => html! { (text) },
    }
}

/// All results of a path, comma-separated; the missing text when there are
/// none.
fn render_results(ctx: &Ctx<'_>, results: &[Lookup<'_>]) -> Markup {
    match results {
        [] => missing(ctx),
        [only] => render_lookup(ctx, *only),
        many => html! {
            @for (i, found) in many.iter().enumerate() {
                @if i > 0 { ", " }
                (render_lookup(ctx, *found))
            }
        },
    }
}

fn render_value(ctx: &Ctx<'_>, value: &Value) -> Markup {
    match value {
        Value::Null => missing(ctx),
        Value::Bool(true) => html! { "Yes" },
        Value::Bool(false) => html! { "No" },
        Value::Number(n) => html! { (n.to_string()) },
        Value::String(s) if s.is_empty() => missing(ctx),
        Value::String(s) => html! { (s) },
        Value::List(items) if items.is_empty() => missing(ctx),
        Value::List(items) => html! {
            ul.values {
                @for item in items {
                    li { (render_lookup(ctx, Lookup::of_value(ctx.resolution, item))) }
                }
            }
        },
        Value::Map(members) if members.is_empty() => missing(ctx),
        Value::Map(members) => html! {
            dl.fields {
                @for (key, member) in members {
                    dt { (render_lookup(ctx, Lookup::of_key(ctx.resolution, key))) }
                    dd { (render_lookup(ctx, Lookup::of_value(ctx.resolution, member))) }
                }
            }
        },
        Value::Ref(_) => render_lookup(ctx, Lookup::of_value(ctx.resolution, value)),
    }
}

fn entity_link(ctx: &Ctx<'_>, id: &EntityId, text: &str) -> Markup {
    html! {
        a href=(format!("{}{}", ctx.root, page_filename(id))) { (text) }
    }
}

fn unresolved(id: &EntityId) -> Markup {
    html! {
        span.unresolved title=(format!("Entity {id} is not in the dataset")) { "#" (id.as_str()) }
    }
}

fn missing(ctx: &Ctx<'_>) -> Markup {
    html! {
        span.missing { (ctx.missing) }
    }
}

/// Short text form of a lookup, for entry labels.
fn plain_text(lookup: Lookup<'_>) -> Option<String> {
    match lookup {
        Lookup::Text(s) if !s.is_empty() => Some(s.to_string()),
        Lookup::Value(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Lookup::Value(Value::Number(n)) => Some(n.to_string()),
        Lookup::Entity(view) => Some(view.name.clone()),
        _ => None,
    }
}
