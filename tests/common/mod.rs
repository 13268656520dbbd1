//! Common test utilities for scaffold-update integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use git2::{IndexAddOption, Repository, Signature};
use tempfile::TempDir;

/// Scaffold output of ember-cli 2.11.1 (trimmed)
pub const OLD_VERSION: &str = "2.11.1";
/// Scaffold output of ember-cli 2.14.1 (trimmed)
pub const NEW_VERSION: &str = "2.14.1";

pub const OLD_ESLINTRC: &str = "module.exports = {
  root: true,
  parserOptions: {
    ecmaVersion: 6,
    sourceType: 'module'
  },
  extends: 'eslint:recommended',
  env: {
    browser: true
  },
  rules: {
  }
};
";

pub const NEW_ESLINTRC: &str = "module.exports = {
  root: true,
  parserOptions: {
    ecmaVersion: 2017,
    sourceType: 'module'
  },
  extends: 'eslint:recommended',
  env: {
    browser: true
  },
  rules: {
  }
};
";

pub const OLD_README: &str = "# my-app

This README outlines the details of collaborating on this Ember application.
A short introduction of this app could easily go here.

## Prerequisites

You will need the following things properly installed on your computer.

* [Git](https://git-scm.com/)
* [Node.js](https://nodejs.org/) (with NPM)
* [Bower](https://bower.io/)
* [Ember CLI](https://ember-cli.com/)

## Installation

* `git clone <repository-url>` this repository
* `cd my-app`
* `npm install`
";

pub const NEW_README: &str = "# my-app

This README outlines the details of collaborating on this Ember application.
A short introduction of this app could easily go here.

## Prerequisites

You will need the following things properly installed on your computer.

* [Git](https://git-scm.com/)
* [Node.js](https://nodejs.org/) (with NPM)
* [Ember CLI](https://ember-cli.com/)

## Installation

* `git clone <repository-url>` this repository
* `cd my-app`
* `npm install`
";

pub const EMBER_CLI: &str = "{\n  \"disableAnalytics\": false\n}\n";

pub const BOWER_JSON: &str = "{\n  \"name\": \"my-app\",\n  \"dependencies\": {\n    \"ember\": \"~2.11.0\"\n  }\n}\n";

pub const TESTEM_JS: &str = "/* eslint-env node */\nmodule.exports = {\n  test_page: 'tests/index.html?hidepassed',\n  launch_in_ci: ['Chrome']\n};\n";

pub const APP_JS: &str = "import Application from '@ember/application';\n\nexport default Application.extend({});\n";

pub fn package_json(version: &str) -> String {
    format!(
        "{{\n  \"name\": \"my-app\",\n  \"private\": true,\n  \"devDependencies\": {{\n    \"ember-cli\": \"~{version}\"\n  }}\n}}\n"
    )
}

/// A git repository holding a scaffolded project, plus a template store
pub struct TestProject {
    /// Repository root
    pub temp: TempDir,
    /// Scaffolds by version, outside the repository
    pub templates: TempDir,
    /// Project root, the repository root or a subfolder of it
    pub path: PathBuf,
}

impl TestProject {
    /// Project at the repository root
    pub fn new() -> Self {
        Self::with_subfolder(None)
    }

    /// Project in `subfolder` of the repository, or at its root
    pub fn with_subfolder(subfolder: Option<&str>) -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let templates = TempDir::new().expect("Failed to create templates directory");

        let repo = Repository::init(temp.path()).expect("Failed to init git repository");
        let mut config = repo.config().expect("Failed to open repo config");
        config
            .set_str("user.name", "Test User")
            .expect("Failed to set user.name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Failed to set user.email");

        let path = match subfolder {
            Some(sub) => temp.path().join(sub),
            None => temp.path().to_path_buf(),
        };
        std::fs::create_dir_all(&path).expect("Failed to create project directory");

        Self {
            temp,
            templates,
            path,
        }
    }

    /// Write the two ember-cli scaffold versions into the template store
    pub fn with_ember_templates(self) -> Self {
        let old = package_json(OLD_VERSION);
        let new = package_json(NEW_VERSION);
        self.write_template(
            OLD_VERSION,
            &[
                ("package.json", old.as_str()),
                (".ember-cli", EMBER_CLI),
                (".eslintrc.js", OLD_ESLINTRC),
                ("README.md", OLD_README),
                ("bower.json", BOWER_JSON),
                ("app/app.js", APP_JS),
            ],
        );
        self.write_template(
            NEW_VERSION,
            &[
                ("package.json", new.as_str()),
                (".ember-cli", EMBER_CLI),
                (".eslintrc.js", NEW_ESLINTRC),
                ("README.md", NEW_README),
                ("testem.js", TESTEM_JS),
                ("app/app.js", APP_JS),
            ],
        );
        self
    }

    /// Write files into `<templates>/<version>/`
    pub fn write_template(&self, version: &str, files: &[(&str, &str)]) {
        let root = self.templates.path().join(version);
        for (path, content) in files {
            write(&root.join(path), content);
        }
    }

    /// Copy a template version into the project and commit it
    pub fn scaffold(&self, version: &str) {
        let root = self.templates.path().join(version);
        for entry in walkdir::WalkDir::new(&root) {
            let entry = entry.expect("Failed to walk template");
            if entry.file_type().is_file() {
                let relative = entry.path().strip_prefix(&root).expect("strip prefix");
                let target = self.path.join(relative);
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent).expect("Failed to create parent");
                }
                std::fs::copy(entry.path(), target).expect("Failed to copy template file");
            }
        }
        self.commit_all(&format!("Scaffold {version}"));
    }

    /// Write a file relative to the project root
    pub fn write_file(&self, path: &str, content: &str) {
        write(&self.path.join(path), content);
    }

    /// Write a file relative to the repository root
    pub fn write_repo_file(&self, path: &str, content: &str) {
        write(&self.temp.path().join(path), content);
    }

    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    pub fn repo(&self) -> Repository {
        Repository::open(self.temp.path()).expect("Failed to open repository")
    }

    /// Stage everything and commit on HEAD
    pub fn commit_all(&self, message: &str) {
        let repo = self.repo();
        let mut index = repo.index().expect("Failed to open index");
        index
            .add_all(["*"], IndexAddOption::DEFAULT, None)
            .expect("Failed to stage files");
        index
            .update_all(["*"], None)
            .expect("Failed to stage deletions");
        index.write().expect("Failed to write index");

        let tree_oid = index.write_tree().expect("Failed to write tree");
        let tree = repo.find_tree(tree_oid).expect("Failed to find tree");
        let sig = Signature::now("Test User", "test@example.com").expect("signature");
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to commit");
    }

    pub fn head_oid(&self) -> String {
        self.repo()
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("No HEAD commit")
            .id()
            .to_string()
    }

    /// Number of references in the repository
    pub fn ref_count(&self) -> usize {
        self.repo()
            .references()
            .expect("Failed to list references")
            .count()
    }

    /// The binary, run from the project root with the template store
    /// configured and no ambient configuration leaking in
    #[allow(deprecated)]
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("scaffold-update").expect("binary");
        cmd.current_dir(&self.path)
            .env("SCAFFOLD_UPDATE_TEMPLATES", self.templates.path())
            .env("XDG_CONFIG_HOME", self.templates.path().join("xdg"))
            .env_remove("SCAFFOLD_UPDATE_PROJECT")
            .env_remove("RUST_LOG");
        cmd
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    std::fs::write(path, content).expect("Failed to write file");
}
