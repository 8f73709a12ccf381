use crate::errors::Error;
use crate::git::GitRepo;
use crate::make_meta::GitMetaMaker;
use crate::mirror::mirror;
use crate::rev_list::{self, RevisionRecord};
use crate::svn::SvnSource;
use crate::term_out::ProgressPrint;
use crate::workspace::Workspace;

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ReplaySummary {
    pub(crate) commits: usize,
}

/// Replays each record as one commit of `repo`, oldest revision first.
///
/// Every commit holds the full exported tree of its record. The run
/// stops at the first failure; commits created before it are kept.
pub(crate) fn replay(
    progress_print: &ProgressPrint,
    source: &dyn SvnSource,
    meta_maker: &GitMetaMaker<'_>,
    workspace: &Workspace,
    repo: &GitRepo,
    mut records: Vec<RevisionRecord>,
) -> Result<ReplaySummary, Error> {
    rev_list::sort_for_replay(&mut records);

    let total = records.len();
    let export_dir = workspace.export_dir();

    for (i, record) in records.iter().enumerate() {
        progress_print.set_progress(format!("replaying r{} ({} / {total})", record.rev, i + 1));

        let entry = source.log_rev(&record.path, record.rev)?;
        let line = format!(
            "{}\t{}\t{}\t{}",
            entry.rev,
            entry.author.as_deref().unwrap_or_default(),
            entry.date.as_deref().unwrap_or_default(),
            entry.message.lines().next().unwrap_or_default(),
        );
        if let Err(e) = progress_print.print_out_line(&line) {
            tracing::warn!("failed to print revision summary: {e}");
        }

        let meta = meta_maker.make_commit_meta(&record.path, &entry)?;

        workspace.clear_export()?;
        source.export(&record.path, record.rev, &export_dir)?;
        mirror(&export_dir, repo.work_dir())?;
        workspace.clear_export()?;

        repo.add_all()?;
        repo.commit(&meta)?;
        tracing::debug!(
            "committed r{} of {} as {} <{}>",
            record.rev,
            record.path,
            meta.author.name,
            meta.author.email,
        );
    }

    progress_print.set_progress(format!("replayed {total} revisions"));
    progress_print.freeze_progress();
    tracing::info!("replayed {total} revisions into {:?}", repo.work_dir());

    Ok(ReplaySummary { commits: total })
}
