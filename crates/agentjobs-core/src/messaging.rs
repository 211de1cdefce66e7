//! Job threads between a company and its hired agent
//!
//! Only the two parties on a job may post or read. Posting is open while
//! work is under way (IN_PROGRESS or PENDING_REVIEW); reading is allowed
//! at any point afterwards so the thread stays auditable.

use agentjobs_types::{Actor, JobAction, JobStatus, MarketError, MessageKind, Result};

use crate::lifecycle::{
    check_length, require_hired_agent, require_owner, require_status, TextLimits,
};
use crate::model::{Job, Message};

/// Which side of a job thread an actor is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Party {
    Company,
    Agent,
}

fn party(job: &Job, actor: &Actor, action: JobAction) -> Result<Party> {
    if require_owner(job, actor, action).is_ok() {
        return Ok(Party::Company);
    }
    require_hired_agent(job, actor, action)?;
    Ok(Party::Agent)
}

/// Post a message on a job's thread
pub fn send_message(
    job: &Job,
    messages: &mut Vec<Message>,
    actor: &Actor,
    kind: MessageKind,
    content: String,
    limits: &TextLimits,
) -> Result<Message> {
    require_status(
        job,
        JobAction::SendMessage,
        &[JobStatus::InProgress, JobStatus::PendingReview],
    )?;
    let from = party(job, actor, JobAction::SendMessage)?;
    match (kind, from) {
        (MessageKind::Instruction, Party::Agent) => {
            return Err(MarketError::invalid_input(
                "kind",
                "instructions come from the company",
            ))
        }
        (MessageKind::Question, Party::Company) => {
            return Err(MarketError::invalid_input(
                "kind",
                "questions come from the hired agent",
            ))
        }
        _ => {}
    }
    if content.trim().is_empty() {
        return Err(MarketError::invalid_input("content", "must not be empty"));
    }
    check_length("content", &content, limits.max_request_chars)?;

    let message = Message::new(job.id.clone(), actor.clone(), kind, content);
    tracing::info!(job_id = %job.id, sender = %actor, kind = ?kind, "message posted");
    messages.push(message.clone());
    Ok(message)
}

/// The whole thread, oldest first, marked read for the caller's side
pub fn read_messages(job: &Job, messages: &mut [Message], actor: &Actor) -> Result<Vec<Message>> {
    let side = party(job, actor, JobAction::ReadMessages)?;
    for message in messages.iter_mut() {
        match side {
            Party::Company => message.read_by_company = true,
            Party::Agent => message.read_by_agent = true,
        }
    }
    Ok(messages.to_vec())
}

/// Messages from the other side the caller has not read yet
pub fn unread_messages(job: &Job, messages: &[Message], actor: &Actor) -> Result<Vec<Message>> {
    let side = party(job, actor, JobAction::ReadMessages)?;
    Ok(messages
        .iter()
        .filter(|m| match side {
            Party::Company => !m.read_by_company,
            Party::Agent => !m.read_by_agent,
        })
        .cloned()
        .collect())
}
