use std::fmt;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::attachment::{AttachmentCheck, validate_attachments};
use crate::board::{Attachment, BoardClient, BoardClientFactory, BoardList, Card, ListRole, WorkflowLists};
use crate::config::Config;
use crate::error::{BoardsubError, Result};
use crate::generator::{GeneratedOutputs, OutputGenerator};
use crate::media::MediaProcessorFactory;
use crate::transcribe::TranscriberFactory;
use crate::workspace::Workspace;

pub const ERROR_CARD_NAME: &str = "Attachment Error";
pub const ERROR_CARD_DESC: &str = "No valid attachment found";

/// Where the card examined in a cycle stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    AwaitingAttachment,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    pub fn can_transition_to(self, next: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Idle, AwaitingAttachment)
                | (AwaitingAttachment, Idle)
                | (AwaitingAttachment, Processing)
                | (AwaitingAttachment, Failed)
                | (Processing, Completed)
        )
    }
}

/// The one card being worked on during a cycle
#[derive(Debug)]
struct Job {
    card: Card,
    state: JobState,
}

impl Job {
    fn new(card: Card) -> Self {
        let mut job = Self {
            card,
            state: JobState::Idle,
        };
        job.advance(JobState::AwaitingAttachment);
        job
    }

    fn advance(&mut self, next: JobState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid job transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!("Card {} ({}): {:?} -> {:?}", self.card.id, self.card.name, self.state, next);
        self.state = next;
    }
}

/// What a single poll cycle did
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The board has no list named "in"
    NoInList,
    /// The IN list has no cards
    EmptyInList,
    /// The first card has no attachments; left in place
    NoAttachments { card: Card },
    /// The first card has attachments but no usable audio; left in place
    AttachmentError { card: Card, error_card: Option<Card> },
    /// The card was processed and moved to "out"
    Completed { card: Card, outputs: GeneratedOutputs },
}

impl CycleOutcome {
    pub fn state(&self) -> JobState {
        match self {
            CycleOutcome::NoInList | CycleOutcome::EmptyInList => JobState::Idle,
            CycleOutcome::NoAttachments { .. } => JobState::Idle,
            CycleOutcome::AttachmentError { .. } => JobState::Failed,
            CycleOutcome::Completed { .. } => JobState::Completed,
        }
    }
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::NoInList => write!(f, "No IN list found"),
            CycleOutcome::EmptyInList => write!(f, "IN list is empty"),
            CycleOutcome::NoAttachments { card } => {
                write!(f, "Card '{}' has no attachments", card.name)
            }
            CycleOutcome::AttachmentError { card, error_card } => {
                write!(f, "Card '{}' has no valid attachment", card.name)?;
                if error_card.is_none() {
                    write!(f, " (no errors list to report to)")?;
                }
                Ok(())
            }
            CycleOutcome::Completed { card, outputs } => {
                write!(f, "Card '{}' processed into {}", card.name, outputs.video.display())
            }
        }
    }
}

/// Long-lived context for the polling loop, built once at startup
pub struct Workflow {
    board: Box<dyn BoardClient>,
    generator: OutputGenerator,
    workspace: Workspace,
    board_id: String,
    poll_interval: Duration,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let board = BoardClientFactory::create_client(config.trello.clone())?;
        let generator = OutputGenerator::new(
            TranscriberFactory::create_default(config.transcriber.clone()),
            MediaProcessorFactory::create_processor(config.media.clone()),
            &config.media,
        );

        Ok(Self::with_parts(
            board,
            generator,
            Workspace::new(&config.workspace.root),
            config.trello.board_id,
            Duration::from_secs(config.poll.interval_secs),
        ))
    }

    pub fn with_parts(
        board: Box<dyn BoardClient>,
        generator: OutputGenerator,
        workspace: Workspace,
        board_id: String,
        poll_interval: Duration,
    ) -> Self {
        Self {
            board,
            generator,
            workspace,
            board_id,
            poll_interval,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn generator(&self) -> &OutputGenerator {
        &self.generator
    }

    /// Poll forever, one card at a time. Returns only when a cycle fails.
    pub async fn run_forever(&self) -> Result<()> {
        info!(
            "Watching board {} every {}s",
            self.board_id,
            self.poll_interval.as_secs()
        );

        loop {
            let outcome = self.run_cycle().await?;
            info!("{}", outcome);
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Run one poll cycle
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let lists = self.board.get_lists(&self.board_id).await?;
        let lists = WorkflowLists::resolve(&lists);

        let Some(in_list) = lists.get(ListRole::In) else {
            info!("No IN list found");
            return Ok(CycleOutcome::NoInList);
        };

        let Some(card) = self.board.get_cards(&in_list.id, 1).await?.into_iter().next() else {
            debug!("IN list is empty");
            return Ok(CycleOutcome::EmptyInList);
        };

        info!("Found card '{}' ({}) in IN", card.name, card.id);
        let mut job = Job::new(card);

        let attachments = self.board.get_attachments(&job.card.id).await?;
        let check = validate_attachments(&attachments);

        if let Some(attachment) = check.first() {
            if let AttachmentCheck::Valid(valid) = &check {
                if valid.len() > 1 {
                    info!("{} valid attachments, processing only the first", valid.len());
                }
            }
            return self.process(job, attachment, &lists).await;
        }

        match check {
            AttachmentCheck::NoAttachments => {
                info!("No attachment found on card '{}'", job.card.name);
                job.advance(JobState::Idle);
                Ok(CycleOutcome::NoAttachments { card: job.card })
            }
            AttachmentCheck::NoneValid | AttachmentCheck::Valid(_) => {
                warn!("No valid attachment found on card '{}'", job.card.name);
                job.advance(JobState::Failed);
                let error_card = self.report_attachment_error(&lists).await?;
                Ok(CycleOutcome::AttachmentError {
                    card: job.card,
                    error_card,
                })
            }
        }
    }

    async fn report_attachment_error(&self, lists: &WorkflowLists) -> Result<Option<Card>> {
        let Some(errors) = lists.get(ListRole::Errors) else {
            warn!("No errors list on board, attachment error not reported");
            return Ok(None);
        };

        let card = self
            .board
            .create_card(&errors.id, ERROR_CARD_NAME, ERROR_CARD_DESC)
            .await?;
        info!("Error card added to error list");
        Ok(Some(card))
    }

    async fn process(
        &self,
        mut job: Job,
        attachment: &Attachment,
        lists: &WorkflowLists,
    ) -> Result<CycleOutcome> {
        // Both targets must exist before the card is touched
        let process_list = required_list(lists, ListRole::Process)?;
        let out_list = required_list(lists, ListRole::Out)?;

        job.advance(JobState::Processing);

        let file_name = attachment.file_name.as_deref().unwrap_or_default();
        let contents = self.board.download_attachment(&attachment.url).await?;
        let audio_path = self.workspace.stage_attachment(file_name, &contents).await?;

        self.board.move_card(&job.card.id, &process_list.id).await?;
        info!("Card '{}' moved to {}", job.card.name, process_list.name);

        let outputs = self.generator.generate(&audio_path, &self.workspace).await?;

        for file in outputs.files() {
            self.board.upload_attachment(&job.card.id, &file).await?;
        }

        self.board.move_card(&job.card.id, &out_list.id).await?;
        info!("Card '{}' moved to {}", job.card.name, out_list.name);
        job.advance(JobState::Completed);

        remove_final_video(&outputs.video).await;

        Ok(CycleOutcome::Completed {
            card: job.card,
            outputs,
        })
    }
}

fn required_list(lists: &WorkflowLists, role: ListRole) -> Result<&BoardList> {
    lists
        .get(role)
        .ok_or_else(|| BoardsubError::MissingList(role.as_str().to_string()))
}

/// Best-effort cleanup; a failure here never fails the cycle
async fn remove_final_video(path: &Path) {
    info!("Deleting the final video");
    match fs::remove_file(path).await {
        Ok(()) => info!("Done deleting the final video"),
        Err(e) => warn!("Could not delete final video {}: {}", path.display(), e),
    }
}
