use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::context::ModuleCtx;
use crate::contracts::{DbModule, Module, RestHostModule, RestfulModule, StatefulModule};

/// One registered module and the capabilities it opted into.
pub struct ModuleEntry {
    name: &'static str,
    deps: Vec<&'static str>,
    core: Arc<dyn Module>,
    db: Option<Arc<dyn DbModule>>,
    rest: Option<Arc<dyn RestfulModule>>,
    rest_host: Option<Arc<dyn RestHostModule>>,
    stateful: Option<Arc<dyn StatefulModule>>,
}

impl ModuleEntry {
    pub fn new(name: &'static str, core: Arc<dyn Module>) -> Self {
        Self {
            name,
            deps: Vec::new(),
            core,
            db: None,
            rest: None,
            rest_host: None,
            stateful: None,
        }
    }

    pub fn depends_on(mut self, deps: &[&'static str]) -> Self {
        self.deps.extend_from_slice(deps);
        self
    }

    pub fn with_db(mut self, m: Arc<dyn DbModule>) -> Self {
        self.db = Some(m);
        self
    }

    pub fn with_rest(mut self, m: Arc<dyn RestfulModule>) -> Self {
        self.rest = Some(m);
        self
    }

    pub fn with_rest_host(mut self, m: Arc<dyn RestHostModule>) -> Self {
        self.rest_host = Some(m);
        self
    }

    pub fn with_stateful(mut self, m: Arc<dyn StatefulModule>) -> Self {
        self.stateful = Some(m);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl std::fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleEntry")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .field("db", &self.db.is_some())
            .field("rest", &self.rest.is_some())
            .field("rest_host", &self.rest_host.is_some())
            .field("stateful", &self.stateful.is_some())
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("module '{0}' is registered twice")]
    Duplicate(&'static str),
    #[error("module '{module}' depends on unknown module '{depends_on}'")]
    UnknownDependency {
        module: &'static str,
        depends_on: &'static str,
    },
    #[error("dependency cycle: {}", path.join(" -> "))]
    CycleDetected { path: Vec<&'static str> },
    #[error("REST modules are registered but no REST host is present")]
    RestRequiresHost,
    #[error("multiple REST hosts: '{0}' and '{1}'")]
    MultipleRestHosts(&'static str, &'static str),

    #[error("init failed for '{module}'")]
    Init {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("migration failed for '{module}'")]
    DbMigrate {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST wiring failed for '{module}'")]
    Rest {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("start failed for '{module}'")]
    Start {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// Collects modules in registration order; `build` validates and orders them.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<ModuleEntry>,
}

impl RegistryBuilder {
    pub fn register(&mut self, entry: ModuleEntry) -> &mut Self {
        self.entries.push(entry);
        self
    }

    /// Dependencies come first; otherwise registration order is kept.
    pub fn build(self) -> Result<ModuleRegistry, RegistryError> {
        let mut index: HashMap<&'static str, usize> = HashMap::new();
        for (i, e) in self.entries.iter().enumerate() {
            if index.insert(e.name, i).is_some() {
                return Err(RegistryError::Duplicate(e.name));
            }
        }

        let mut host: Option<&'static str> = None;
        for e in self.entries.iter().filter(|e| e.rest_host.is_some()) {
            if let Some(first) = host {
                return Err(RegistryError::MultipleRestHosts(first, e.name));
            }
            host = Some(e.name);
        }
        if host.is_none() && self.entries.iter().any(|e| e.rest.is_some()) {
            return Err(RegistryError::RestRequiresHost);
        }

        let mut deps: Vec<Vec<usize>> = Vec::with_capacity(self.entries.len());
        for e in &self.entries {
            let mut resolved = Vec::with_capacity(e.deps.len());
            for d in &e.deps {
                let i = *index.get(d).ok_or(RegistryError::UnknownDependency {
                    module: e.name,
                    depends_on: *d,
                })?;
                resolved.push(i);
            }
            deps.push(resolved);
        }

        let order = topo_order(&self.entries, &deps)?;
        let mut slots: Vec<Option<ModuleEntry>> = self.entries.into_iter().map(Some).collect();
        let modules = order.into_iter().filter_map(|i| slots[i].take()).collect();
        Ok(ModuleRegistry { modules })
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Depth-first post-order over dependency edges, reporting the first cycle found.
fn topo_order(
    entries: &[ModuleEntry],
    deps: &[Vec<usize>],
) -> Result<Vec<usize>, RegistryError> {
    fn visit(
        node: usize,
        entries: &[ModuleEntry],
        deps: &[Vec<usize>],
        marks: &mut [Mark],
        stack: &mut Vec<usize>,
        out: &mut Vec<usize>,
    ) -> Result<(), RegistryError> {
        match marks[node] {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                let start = stack.iter().position(|&n| n == node).unwrap_or(0);
                let mut path: Vec<&'static str> =
                    stack[start..].iter().map(|&i| entries[i].name).collect();
                path.push(entries[node].name);
                return Err(RegistryError::CycleDetected { path });
            }
            Mark::Unvisited => {}
        }

        marks[node] = Mark::InProgress;
        stack.push(node);
        for &d in &deps[node] {
            visit(d, entries, deps, marks, stack, out)?;
        }
        stack.pop();
        marks[node] = Mark::Done;
        out.push(node);
        Ok(())
    }

    let mut marks = vec![Mark::Unvisited; entries.len()];
    let mut out = Vec::with_capacity(entries.len());
    let mut stack = Vec::new();
    for i in 0..entries.len() {
        visit(i, entries, deps, &mut marks, &mut stack, &mut out)?;
    }
    Ok(out)
}

/// Validated, dependency-ordered set of modules.
pub struct ModuleRegistry {
    modules: Vec<ModuleEntry>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.modules.iter().map(|m| m.name))
            .finish()
    }
}

impl ModuleRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name).collect()
    }

    pub async fn run_init_phase(&self, base_ctx: &ModuleCtx) -> Result<(), RegistryError> {
        for e in &self.modules {
            tracing::debug!(module = e.name, "init");
            let ctx = base_ctx.clone().for_module(e.name);
            e.core
                .init(&ctx)
                .await
                .map_err(|source| RegistryError::Init {
                    module: e.name,
                    source,
                })?;
        }
        Ok(())
    }

    pub async fn run_db_phase(&self, db: &modkit_db::DbHandle) -> Result<(), RegistryError> {
        for e in &self.modules {
            if let Some(m) = &e.db {
                tracing::debug!(module = e.name, "migrate");
                m.migrate(db)
                    .await
                    .map_err(|source| RegistryError::DbMigrate {
                        module: e.name,
                        source,
                    })?;
            }
        }
        Ok(())
    }

    /// host.prepare → every RestfulModule → host.finalize.
    pub fn run_rest_phase(
        &self,
        base_ctx: &ModuleCtx,
        router: Router,
    ) -> Result<Router, RegistryError> {
        let Some(host_entry) = self.modules.iter().find(|e| e.rest_host.is_some()) else {
            return Ok(router);
        };
        let Some(host) = host_entry.rest_host.as_ref() else {
            return Ok(router);
        };
        let host_ctx = base_ctx.clone().for_module(host_entry.name);
        let host_err = |source| RegistryError::Rest {
            module: host_entry.name,
            source,
        };

        let mut router = host.rest_prepare(&host_ctx, router).map_err(host_err)?;
        for e in &self.modules {
            if let Some(rest) = &e.rest {
                let ctx = base_ctx.clone().for_module(e.name);
                router = rest
                    .register_rest(&ctx, router)
                    .map_err(|source| RegistryError::Rest {
                        module: e.name,
                        source,
                    })?;
            }
        }
        host.rest_finalize(&host_ctx, router).map_err(host_err)
    }

    pub async fn run_start_phase(&self, cancel: CancellationToken) -> Result<(), RegistryError> {
        for e in &self.modules {
            if let Some(s) = &e.stateful {
                tracing::debug!(module = e.name, "start");
                s.start(cancel.clone())
                    .await
                    .map_err(|source| RegistryError::Start {
                        module: e.name,
                        source,
                    })?;
            }
        }
        Ok(())
    }

    /// Reverse order; failures are logged and do not stop the remaining modules.
    pub async fn run_stop_phase(&self, cancel: CancellationToken) {
        for e in self.modules.iter().rev() {
            if let Some(s) = &e.stateful {
                if let Err(err) = s.stop(cancel.clone()).await {
                    tracing::warn!(module = e.name, error = %err, "failed to stop module");
                }
            }
        }
    }
}
