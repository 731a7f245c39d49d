//! `solbatch sources`: list the compilation set without compiling

use anyhow::Context;

use solbatch_engine::{DiskReader, DocumentOrigin, Driver};

use super::ProjectArgs;
use crate::output::StyledOutput;
use crate::search::GlobSearch;

/// Print every source in compile order, then unresolved imports
pub fn execute(args: ProjectArgs, out: &mut StyledOutput) -> anyhow::Result<usize> {
    let (workspace, settings) = args.load()?;
    let driver = Driver::new(&workspace, &GlobSearch, &DiskReader);
    let (project, collection) = driver.collect(&settings).context("cannot collect sources")?;

    let set = collection.compilation_set(&project, settings.optimizer_runs);
    for unit in set.units() {
        let buffered = collection
            .get(&unit.path)
            .is_some_and(|doc| doc.origin() == DocumentOrigin::Buffer);
        out.plain(&unit.name);
        if buffered {
            out.info(" (buffer)");
        }
        out.newline();
    }

    let mut failures = 0;
    for (path, error) in collection.import_errors() {
        failures += 1;
        out.error("unresolved");
        out.dim(&format!(" {}: ", path.display()));
        out.plain(&error.to_string());
        out.newline();
    }

    Ok(failures)
}
