#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};
use vanilla_lint::{CliArgs, LintConfig};

pub const CLEAN_INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Clean site</title>
  <link rel="stylesheet" href="css/site.css">
</head>
<body>
  <header class="site-header">
    <nav class="site-nav">
      <a class="site-nav__link" href="/">Home</a>
      <a class="site-nav__link site-nav__link--active" href="/about.html">About</a>
    </nav>
  </header>
  <main>
    <img class="hero" src="img/hero.png" alt="">
  </main>
  <script src="js/app.js"></script>
</body>
</html>
"#;

pub const CLEAN_CSS: &str = r#".site-header { display: flex; }
.site-nav__link { color: #333; }
.site-nav__link--active { font-weight: bold; }
@media (min-width: 40em) {
  .hero { width: 100%; }
}
"#;

pub const CLEAN_JS: &str = r#"const links = document.querySelectorAll('.site-nav__link');
for (const link of links) {
  link.addEventListener('click', () => {
    if (link.dataset.state === 'open') {
      link.classList.remove('is-open');
    }
  });
}
"#;

pub const MESSY_INDEX: &str = r#"<html>
<body>
  <div class="nav">
    <a href="/">Home</a>
    <a href="/about.html">About</a>
  </div>
  <center><img src="logo.png"></center>
  <p style="color: red" onclick="go()">Hi</p>
  <div class="cardTitle"></div>
  <script>document.write('x')</script>
</body>
</html>
"#;

pub const MESSY_CSS: &str = r#"#main { color: red !important; }
.Card_title { margin: 0; }
"#;

pub const MESSY_JS: &str = r#"var count = 0;
if (count == 1) {
  document.write('<p>' + count + '</p>');
}
"#;

/// A throwaway site directory
pub struct TestSite {
    _tempdir: TempDir,
    root: PathBuf,
}

impl TestSite {
    pub fn new() -> Self {
        let tempdir = tempdir().expect("tempdir");
        let root = tempdir.path().to_path_buf();
        Self {
            _tempdir: tempdir,
            root,
        }
    }

    /// A site with no violations under the default profile
    pub fn clean() -> Self {
        Self::new()
            .with_file("index.html", CLEAN_INDEX)
            .with_file("css/site.css", CLEAN_CSS)
            .with_file("js/app.js", CLEAN_JS)
    }

    /// A site that breaks a rule in every category
    pub fn messy() -> Self {
        Self::new()
            .with_file("index.html", MESSY_INDEX)
            .with_file("css/site.css", MESSY_CSS)
            .with_file("js/app.js", MESSY_JS)
            .with_file("MainScript.js", "let x = 1;\n")
    }

    pub fn with_file(self, rel: &str, contents: &str) -> Self {
        self.write(rel, contents.as_bytes());
        self
    }

    pub fn write(&self, rel: &str, contents: &[u8]) {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create dir");
        }
        std::fs::write(path, contents).expect("write fixture");
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Default configuration pointed at this site
    pub fn config(&self) -> LintConfig {
        self.config_with(CliArgs::default())
    }

    pub fn config_with(&self, mut args: CliArgs) -> LintConfig {
        if args.paths.is_empty() {
            args.paths = vec![self.root.clone()];
        }
        LintConfig::from_args(args).expect("config")
    }
}
