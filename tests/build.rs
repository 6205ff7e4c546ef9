//! End-to-end builds of small sites on disk.

use bladerunner::{
    build::{BuildSummary, build_site, compile_one},
    compiler::Compiler,
    config::SiteConfig,
};
use std::{
    fs,
    path::{Path, PathBuf},
};

const CONFIG: &str = r#"
[directives]
shout = "<?php echo strtoupper({args}); ?>"
"#;

const INDEX: &str = r#"---
title: Home
layout: base
---
@section('title')Home@endsection
@push('scripts', '<script src="a.js"></script>')
@include('nav')
@component('card')
@slot('title', 'Hi')
Body
@endcomponent
@shout('x')
"#;

const LAYOUT: &str = r#"<title>@yield('title')</title>
@stack('scripts')
<main>@yield('content')</main>
"#;

struct Site {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl Site {
    fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        for (path, text) in files {
            let full = root.join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, text).unwrap();
        }
        Self { _dir: dir, root }
    }

    fn config(&self) -> SiteConfig {
        let config = SiteConfig::load(&self.root, Path::new("bladerunner.toml")).unwrap();
        config.validate().unwrap();
        config
    }

    fn output(&self, path: &str) -> String {
        fs::read_to_string(self.root.join("public").join(path))
            .unwrap_or_else(|e| panic!("missing output {path}: {e}"))
    }
}

fn sample() -> Site {
    Site::new(&[
        ("bladerunner.toml", CONFIG),
        ("source/index.blade", INDEX),
        ("source/_layouts/base.blade", LAYOUT),
        ("source/_includes/nav.blade", "<nav>{{ $page->title }}</nav>"),
        ("source/_includes/card.blade.php", "<div>{{ $slot->title }}</div>"),
        ("source/blog/post.blade", "---\npermalink: /articles/first/\n---\n<p>post</p>"),
        ("source/css/site.css", "body { margin: 0 }"),
    ])
}

#[test]
fn test_build_writes_pages_partials_and_statics() {
    let site = sample();
    let summary = build_site(&site.config()).unwrap();
    assert_eq!(summary, BuildSummary { compiled: 5, copied: 1, skipped: 0 });

    let index = site.output("index.php");
    assert!(index.contains(r#"$page = json_decode(ob_get_clean())"#));
    assert!(index.contains(r#"$page->url = "/";"#));
    assert!(index.contains(r#"include dirname(__FILE__) . "/_layouts/base.php";"#));
    assert!(index.contains(r#"dirname(__FILE__) . "/_includes/nav.php""#));
    assert!(index.contains(r#"dirname(__FILE__) . "/_includes/card.php""#));
    assert!(index.contains(r#"$slot->title = "Hi" ?? "";"#));
    assert!(index.contains(r#"$stacks["scripts"] = array_merge("#));
    assert!(index.contains("<?php echo strtoupper('x'); ?>"));
    for directive in ["@section", "@push", "@include", "@component", "@slot", "@shout"] {
        assert!(!index.contains(directive), "{directive} left in output");
    }

    // Sections run before the body that yields them
    let title = index.find(r#"$sections["title"] = ob_get_clean()"#).unwrap();
    let content = index.find(r#"$sections["content"] = ob_get_clean()"#).unwrap();
    assert!(title < content);

    let post = site.output("articles/first/index.php");
    assert!(post.contains(r#"$page->url = "/articles/first";"#));
    assert!(post.contains("<p>post</p>"));

    let layout = site.output("_layouts/base.php");
    assert!(!layout.contains("json_decode"));
    assert!(layout.contains(r#"<title><?php echo $sections["title"] ?? ""; ?></title>"#));
    assert!(layout.contains(r#"<?php echo join("", $stacks["scripts"] ?? []); ?>"#));

    assert!(site.output("_includes/nav.php").contains("htmlspecialchars($page->title"));
    assert!(site.output("_includes/card.php").contains("<div>"));
    assert_eq!(site.output("css/site.css"), "body { margin: 0 }");
}

#[test]
fn test_rebuild_skips_up_to_date_outputs() {
    let site = sample();
    let config = site.config();
    build_site(&config).unwrap();

    let again = build_site(&config).unwrap();
    assert_eq!(again, BuildSummary { compiled: 0, copied: 0, skipped: 6 });
}

#[test]
fn test_clean_build_rewrites_everything() {
    let site = sample();
    let mut config = site.config();
    build_site(&config).unwrap();
    fs::write(site.root.join("public/stale.php"), "old").unwrap();

    config.build.clean = true;
    let summary = build_site(&config).unwrap();
    assert_eq!(summary, BuildSummary { compiled: 5, copied: 1, skipped: 0 });
    assert!(!site.root.join("public/stale.php").exists());
}

#[test]
fn test_unsafe_output_echoes_raw() {
    let site = sample();
    let mut config = site.config();
    config.build.safe_output = false;
    build_site(&config).unwrap();

    let nav = site.output("_includes/nav.php");
    assert!(!nav.contains("htmlspecialchars"));
    assert!(nav.contains("echo $page->title"));
}

#[test]
fn test_buffer_wraps_page_output() {
    let site = Site::new(&[
        ("bladerunner.toml", "[build]\nbuffer = \"minify\"\n"),
        ("source/index.blade", "<p>x</p>"),
    ]);
    build_site(&site.config()).unwrap();

    let index = site.output("index.php");
    assert!(index.starts_with("<?php ob_start(); ?>"));
    assert!(index.trim_end().ends_with("<?php echo minify(ob_get_clean()); ?>"));
}

#[test]
fn test_custom_dirs() {
    let site = Site::new(&[
        ("bladerunner.toml", "[build.dirs]\nincludes = \"partials\"\n"),
        ("source/index.blade", "@include('nav')"),
        ("source/partials/nav.blade", "<nav/>"),
    ]);
    build_site(&site.config()).unwrap();

    assert!(site.output("index.php").contains(r#""/partials/nav.php""#));
    assert_eq!(site.output("partials/nav.php"), "<nav/>");
}

#[test]
fn test_compile_one_matches_build() {
    let site = sample();
    let config = site.config();
    build_site(&config).unwrap();

    let file = config.build.source.join("blog/post.blade");
    let printed = compile_one(&config, &file, None).unwrap();
    assert_eq!(printed, site.output("articles/first/index.php"));
}

#[test]
fn test_library_compiler_with_closure_directive() {
    let compiler = Compiler::default().directive("year", |unit| {
        unit.content
            .contains("@year")
            .then(|| unit.with_content(unit.content.replace("@year", "<?php echo date('Y'); ?>")))
    });

    let compiled = compiler.compile_str("(c) @year", Path::new("index.php"));
    assert_eq!(compiled.unit.content, "(c) <?php echo date('Y'); ?>");
    assert!(compiled.report.stages.contains(&"year".to_owned()));
}
