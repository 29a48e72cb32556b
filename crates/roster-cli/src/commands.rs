use anyhow::{Context, Result};
use tracing::{info, info_span};

use roster_cli::config::ImportSettings;
use roster_cli::pipeline::{import, load_table, propose, resolve_mapping, write_mapping};
use roster_commit::{CancelFlag, ImportReport};
use roster_map::{ConfidenceThresholds, FieldCatalog};
use roster_model::TenantId;

use crate::cli::{CommitArgs, FieldsArgs, InspectArgs, ProposeArgs};
use crate::summary::{print_fields, print_preview, print_proposal, print_report};

pub fn run_fields(args: &FieldsArgs, settings: &ImportSettings) {
    let profile = args.profile.map_or(settings.mapping.profile, Into::into);
    print_fields(&FieldCatalog::for_profile(profile));
}

pub fn run_inspect(args: &InspectArgs, settings: &ImportSettings) -> Result<()> {
    let table = load_table(&args.file, settings)?;
    print_preview(&table, args.rows);
    Ok(())
}

pub fn run_propose(args: &ProposeArgs, mut settings: ImportSettings) -> Result<()> {
    args.mapping.apply(&mut settings);
    let table = load_table(&args.file, &settings)?;
    let proposal = propose(&table, &settings);

    if args.json {
        let json = serde_json::to_string_pretty(&proposal).context("serialize proposal")?;
        println!("{json}");
    } else {
        print_proposal(
            &proposal,
            &ConfidenceThresholds::with_min(settings.mapping.min_confidence),
        );
    }
    if let Some(output) = &args.output {
        write_mapping(output, &proposal.mapping)?;
        info!(path = %output.display(), fields = proposal.mapping.len(), "mapping written");
        eprintln!("Mapping written to {}", output.display());
    }
    Ok(())
}

pub fn run_commit(args: &CommitArgs, mut settings: ImportSettings) -> Result<ImportReport> {
    args.apply(&mut settings);
    let tenant = args.tenant.trim();
    anyhow::ensure!(!tenant.is_empty(), "--tenant must not be empty");
    let tenant = TenantId::new(tenant);

    let span = info_span!("commit", file = %args.file.display());
    let _guard = span.enter();
    let table = load_table(&args.file, &settings)?;
    let mapping = resolve_mapping(&table, args.mapping_file.as_deref(), &settings)?;
    let report = import(&table, &mapping, &tenant, &settings, &CancelFlag::new())?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("serialize report")?;
        println!("{json}");
    } else {
        print_report(&report);
    }
    Ok(report)
}
