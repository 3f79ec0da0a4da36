#![allow(dead_code)]

use brrtrouter_contract::contract::{ContractValidator, RecordingSink};
use brrtrouter_contract::spec_cache::{DurableStore, SpecValidatorCache};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const WIDGETS_SPEC: &str = r##"
openapi: 3.0.3
info:
  title: Widget Service
  version: 1.0.0
servers:
  - url: http://localhost:8080/api/v1
paths:
  /widgets:
    get:
      operationId: list_widgets
      responses:
        "200":
          description: All widgets
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: "#/components/schemas/Widget"
    post:
      operationId: create_widget
      requestBody:
        required: true
        content:
          application/json:
            schema:
              $ref: "schemas/widget.yaml#/NewWidget"
      responses:
        "201":
          description: Created
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Widget"
        "4XX":
          $ref: "#/components/responses/Error"
  /widgets/{id}:
    parameters:
      - name: id
        in: path
        required: true
        schema:
          type: string
    get:
      operationId: get_widget
      responses:
        "200":
          description: A widget
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Widget"
        "4XX":
          $ref: "#/components/responses/Error"
    patch:
      operationId: touch_widget
      requestBody:
        required: false
        content:
          application/json:
            schema:
              $ref: "schemas/widget.yaml#/NewWidget"
      responses:
        "204":
          description: Touched
  /widgets/{id}/label:
    get:
      operationId: get_widget_label
      responses:
        "200":
          description: Label
          content:
            text/plain:
              schema:
                type: string
components:
  schemas:
    Widget:
      type: object
      required: [id, name]
      properties:
        id:
          type: string
        name:
          type: string
        description:
          type: string
          nullable: true
    Error:
      type: object
      required: [message]
      properties:
        message:
          type: string
  responses:
    Error:
      description: Client error
      content:
        application/json:
          schema:
            $ref: "#/components/schemas/Error"
"##;

pub const NEW_WIDGET_SCHEMA: &str = r#"
NewWidget:
  type: object
  required: [name]
  properties:
    name:
      type: string
      minLength: 1
    description:
      type: string
      nullable: true
"#;

/// A spec directory holding `index.yaml` and `schemas/widget.yaml`.
pub struct SpecFixture {
    pub dir: TempDir,
    pub spec: PathBuf,
}

impl SpecFixture {
    pub fn widgets() -> Self {
        let dir = TempDir::new().unwrap();
        let spec = dir.path().join("index.yaml");
        fs::write(&spec, WIDGETS_SPEC).unwrap();
        fs::create_dir(dir.path().join("schemas")).unwrap();
        fs::write(dir.path().join("schemas/widget.yaml"), NEW_WIDGET_SCHEMA).unwrap();
        Self { dir, spec }
    }

    pub fn schema_file(&self) -> PathBuf {
        self.dir.path().join("schemas/widget.yaml")
    }
}

/// Durable cache directory kept apart from the spec directory.
pub struct CacheFixture {
    pub dir: TempDir,
}

impl CacheFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// A fresh cache over the same durable directory, as a new process would see it.
    pub fn cache(&self, partition: &str) -> SpecValidatorCache {
        SpecValidatorCache::with_store(DurableStore::new(self.dir.path(), partition))
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Orchestrator over `spec` with a memory-only cache and a recording sink.
pub fn contract(spec: &Path) -> ContractValidator<PathBuf, RecordingSink> {
    ContractValidator::new(spec.to_path_buf())
        .with_cache(Arc::new(SpecValidatorCache::memory_only()))
        .with_sink(RecordingSink::default())
}
