//! Final page program.
//!
//! A compiled page body is wrapped into a standalone PHP program:
//!
//! ```text
//! [ob_start()]                       only with an output buffer function
//! $page = json_decode(front matter)
//! request prologue                   $segments, $segment, $post, $get, ...
//! _plugins/*.php, _data/*.php
//! before fragments                   @section captures
//! $sections["content"] = body
//! after fragments                    layout include or echo content
//! [echo buffer(ob_get_clean())]
//! ```

use crate::compiler::{Conventions, TemplateUnit, php};
use serde_json::Value;

/// Page facts that live outside the template text.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub url: &'a str,
    /// Source modification time, Unix seconds.
    pub modified: u64,
    pub buffer: Option<&'a str>,
    pub dirs: &'a Conventions,
}

/// Request globals exposed to every page.
const PROLOGUE: &str = concat!(
    r#"$segments = explode("/", preg_replace("/^\\/|\\/$/", "", parse_url($_SERVER["REQUEST_URI"])["path"])); "#,
    r#"$segment = (object) ["one" => "", "two" => "", "three" => "", "four" => "", "five" => "", "six" => ""]; "#,
    r#"array_map(function ($value, $key) use ($segment) { $target = ["one", "two", "three", "four", "five", "six"][$key] ?? null; if ($target) { $segment->$target = $value; } }, $segments, array_keys($segments)); "#,
    r#"$segments = join("/", $segments); "#,
    r#"$post = (object) $_POST; $get = (object) $_GET; $server = (object) array_change_key_case($_SERVER); "#,
    r#"$sections = []; $stacks = [];"#,
);

/// Layout include, or a plain echo of the content section without one.
fn layout_fragment(unit: &TemplateUnit, dirs: &Conventions) -> String {
    match unit.setting("layout").filter(|l| !l.trim().is_empty()) {
        Some(layout) => format!(
            "<?php include {}; ?>",
            php::dir_path(&unit.relative_path, &dirs.layouts, layout)
        ),
        None => r#"<?php echo $sections["content"]; ?>"#.to_owned(),
    }
}

/// Wrap a compiled page unit into the final program.
pub fn page(mut unit: TemplateUnit, ctx: &PageContext) -> String {
    unit.after.push(layout_fragment(&unit, ctx.dirs));

    // Emitted as raw text, so a `<?` inside a string value must not open PHP
    let settings = Value::Object(unit.metadata.clone()).to_string().replace("<?", "\\u003c?");
    let rel = &unit.relative_path;
    let url = ctx.url.replace('\\', "\\\\").replace('"', "\\\"").replace('$', "\\$");

    let mut parts = Vec::with_capacity(unit.before.len() + unit.after.len() + 8);
    if ctx.buffer.is_some() {
        parts.push("<?php ob_start(); ?>".to_owned());
    }
    parts.push(format!(
        "<?php ob_start(); ?>{settings}<?php $page = json_decode(ob_get_clean()); ?>"
    ));
    parts.push(format!(
        r#"<?php {PROLOGUE} $page->url = "{url}"; $page->modified = {};"#,
        ctx.modified
    ));
    parts.push(format!(
        r#"foreach (glob(dirname(__FILE__) . "{rel}/{}/*.php") as $plugin) {{ include $plugin; }}"#,
        ctx.dirs.plugins
    ));
    parts.push(format!(
        r#"foreach (glob(dirname(__FILE__) . "{rel}/{}/*.php") as $filename) {{ $label = basename($filename, ".php"); if (!isset($$label)) {{ $contents = include $filename; $$label = json_decode(json_encode($contents)); }} }}"#,
        ctx.dirs.data
    ));
    parts.push("?>".to_owned());
    parts.extend(unit.before.drain(..));
    parts.push(format!(
        "<?php ob_start(); ?>\n{}\n<?php $sections[\"content\"] = ob_get_clean(); ?>",
        unit.content
    ));
    parts.extend(unit.after.drain(..));
    if let Some(buffer) = ctx.buffer {
        parts.push(format!("<?php echo {buffer}(ob_get_clean()); ?>"));
    }

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unit(content: &str, meta: Value) -> TemplateUnit {
        TemplateUnit::new(content).with_metadata(meta.as_object().cloned().unwrap_or_default())
    }

    fn ctx<'a>(dirs: &'a Conventions, buffer: Option<&'a str>) -> PageContext<'a> {
        PageContext {
            url: "/about",
            modified: 1_700_000_000,
            buffer,
            dirs,
        }
    }

    #[test]
    fn test_page_without_layout_echoes_content() {
        let dirs = Conventions::default();
        let out = page(unit("<p>Hi</p>", json!({})), &ctx(&dirs, None));
        assert!(out.starts_with("<?php ob_start(); ?>{}<?php $page = json_decode(ob_get_clean()); ?>"));
        assert!(out.contains("<?php ob_start(); ?>\n<p>Hi</p>\n<?php $sections[\"content\"] = ob_get_clean(); ?>"));
        assert!(out.ends_with(r#"<?php echo $sections["content"]; ?>"#));
    }

    #[test]
    fn test_page_layout_include() {
        let dirs = Conventions::default();
        let mut u = unit("x", json!({ "layout": "blog.post" }));
        u.relative_path = "/..".into();
        let out = page(u, &ctx(&dirs, None));
        assert!(out.ends_with(
            r#"<?php include dirname(__FILE__) . "/../_layouts/blog/post.php"; ?>"#
        ));
    }

    #[test]
    fn test_page_prologue() {
        let dirs = Conventions::default();
        let out = page(unit("x", json!({ "title": "A" })), &ctx(&dirs, None));
        assert!(out.contains(r#"{"title":"A"}"#));
        assert!(out.contains(r#"$page->url = "/about"; $page->modified = 1700000000;"#));
        assert!(out.contains("$sections = []; $stacks = [];"));
        assert!(out.contains(r#"glob(dirname(__FILE__) . "/_plugins/*.php")"#));
        assert!(out.contains(r#"glob(dirname(__FILE__) . "/_data/*.php")"#));
    }

    #[test]
    fn test_sections_run_before_content() {
        let dirs = Conventions::default();
        let mut u = unit("body", json!({}));
        u.before.push("SECTION".into());
        let out = page(u, &ctx(&dirs, None));
        let section = out.find("SECTION").unwrap();
        let content = out.find("$sections[\"content\"] = ob_get_clean()").unwrap();
        assert!(section < content);
    }

    #[test]
    fn test_buffer_wraps_page() {
        let dirs = Conventions::default();
        let out = page(unit("x", json!({})), &ctx(&dirs, Some("minify")));
        assert!(out.starts_with("<?php ob_start(); ?>\n<?php ob_start(); ?>{}"));
        assert!(out.ends_with("<?php echo minify(ob_get_clean()); ?>"));
    }

    #[test]
    fn test_settings_cannot_open_php_block() {
        let dirs = Conventions::default();
        let out = page(unit("x", json!({ "title": "a <?php b" })), &ctx(&dirs, None));
        assert!(out.contains(r#"{"title":"a \u003c?php b"}"#));
    }
}
