//! Stack capability registry.
//!
//! Each stack is described exactly once by its [`StackDef`]: how its
//! requests reach the application, which programs its generator needs, and
//! where the document root sits relative to the project directory. Lookups
//! are O(n) table scans over a seven-entry table.
//!
//! # Adding a New Stack
//!
//! 1. Add a variant to `StackKind` and `StackTag` in `value_objects.rs`
//! 2. Add one [`StackDef`] entry to [`STACK_REGISTRY`]
//! 3. Register a scaffolder for the tag in `devhost-adapters`

use crate::domain::value_objects::StackTag;

/// How the web server hands requests to a stack's application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServingMode {
    /// Files served straight from the document root.
    Static,
    /// `.php` requests passed to php-fpm, everything else static.
    Php,
    /// Every request reverse-proxied to the app on its assigned port.
    Proxy,
}

/// Everything the domain needs to know about one stack.
#[derive(Debug, Clone, Copy)]
pub struct StackDef {
    /// The stack this definition describes.
    pub tag: StackTag,

    /// Human-readable summary for `devhost doctor` and help output.
    pub description: &'static str,

    /// How requests reach the application.
    pub serving: ServingMode,

    /// External programs the generator invokes. Empty for built-in
    /// generators that only write files.
    pub required_programs: &'static [&'static str],

    /// Document root relative to the project directory (`""` = the project
    /// directory itself).
    pub document_subdir: &'static str,
}

/// Single source of truth for stack capabilities.
pub static STACK_REGISTRY: &[StackDef] = &[
    StackDef {
        tag: StackTag::FrameworkPhp,
        description: "Laravel application served through php-fpm",
        serving: ServingMode::Php,
        required_programs: &["composer", "php"],
        document_subdir: "public",
    },
    StackDef {
        tag: StackTag::Cms,
        description: "WordPress site served through php-fpm",
        serving: ServingMode::Php,
        required_programs: &["wp", "php"],
        document_subdir: "",
    },
    StackDef {
        tag: StackTag::Static,
        description: "Plain HTML site",
        serving: ServingMode::Static,
        required_programs: &[],
        document_subdir: "",
    },
    StackDef {
        tag: StackTag::NodeSpa,
        description: "Vite single-page app proxied to its dev server",
        serving: ServingMode::Proxy,
        required_programs: &["npm", "node"],
        document_subdir: "dist",
    },
    StackDef {
        tag: StackTag::NodeServer,
        description: "Node HTTP server behind a reverse proxy",
        serving: ServingMode::Proxy,
        required_programs: &[],
        document_subdir: "public",
    },
    StackDef {
        tag: StackTag::DotnetApp,
        description: ".NET web app behind a reverse proxy",
        serving: ServingMode::Proxy,
        required_programs: &["dotnet"],
        document_subdir: "wwwroot",
    },
    StackDef {
        tag: StackTag::StaticBootstrap,
        description: "HTML site with Bootstrap assets",
        serving: ServingMode::Static,
        required_programs: &[],
        document_subdir: "",
    },
];

/// Look up the definition for a stack tag.
pub fn find_stack(tag: StackTag) -> Option<&'static StackDef> {
    STACK_REGISTRY.iter().find(|def| def.tag == tag)
}

/// Serving mode for a stack; stacks missing from the registry are static.
pub fn serving_mode(tag: StackTag) -> ServingMode {
    find_stack(tag).map_or(ServingMode::Static, |def| def.serving)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_has_exactly_one_definition() {
        for tag in StackTag::ALL {
            let count = STACK_REGISTRY.iter().filter(|def| def.tag == tag).count();
            assert_eq!(count, 1, "{tag} should be registered once");
        }
    }

    #[test]
    fn php_stacks_are_served_through_fpm() {
        assert_eq!(serving_mode(StackTag::FrameworkPhp), ServingMode::Php);
        assert_eq!(serving_mode(StackTag::Cms), ServingMode::Php);
    }

    #[test]
    fn static_stacks_need_no_programs() {
        for tag in [StackTag::Static, StackTag::StaticBootstrap] {
            let def = find_stack(tag).unwrap();
            assert!(def.required_programs.is_empty());
            assert_eq!(def.serving, ServingMode::Static);
        }
    }

    #[test]
    fn document_subdirs_are_relative() {
        for def in STACK_REGISTRY {
            assert!(!def.document_subdir.starts_with('/'), "{}", def.tag);
        }
    }
}
