//! Human-readable rendering of snapshots and the final report.

use lfg_core::{FinalReport, LeftoverPlayers, RunOutcome, SimConfig, Snapshot};

/// ANSI "cursor home + clear screen".
pub const CLEAR_SCREEN: &str = "\x1B[H\x1B[2J";

const RULE: &str = "-----------------------------------------------------------";

pub fn format_input_summary(config: &SimConfig) -> String {
    let mut out = String::new();

    out.push_str("------------------ INPUT SUMMARY ------------------\n");
    out.push_str(&format!("Max Concurrent Instances: {}\n", config.instances));
    out.push_str(&format!("Tanks in Queue: {}\n", config.tanks));
    out.push_str(&format!("Healers in Queue: {}\n", config.healers));
    out.push_str(&format!("DPS in Queue: {}\n", config.dps));
    out.push_str(&format!("Min Dungeon Time: {}s\n", config.min_duration_secs));
    out.push_str(&format!("Max Dungeon Time: {}s\n", config.max_duration_secs));
    out.push_str(RULE);

    out
}

pub fn format_snapshot(snapshot: &Snapshot) -> String {
    let mut out = String::new();

    out.push_str("---------------------- Dungeon Status ----------------------\n");
    for slot in &snapshot.slots {
        out.push_str(&format!("[Dungeon ID] : {}\n", slot.id));
        out.push_str(&format!("[Dungeon Status] : {}\n", slot.status.label()));
        match slot.party {
            Some(party) => {
                out.push_str(&format!("[Party Inside the Dungeon] : Party {party}\n"));
            }
            None => out.push_str("[Party Inside the Dungeon] : None\n"),
        }
        if let Some(remaining) = slot.remaining_secs {
            out.push_str(&format!("[Time Remaining] : {remaining}s\n"));
        }
        out.push_str(&format!("[Party Served] : {}\n", slot.parties_served));
        out.push_str(&format!(
            "[Total Time Served] : {} seconds\n",
            slot.time_served_secs
        ));
        out.push_str(RULE);
        out.push('\n');
    }
    out.push_str(&format!(
        "[All Parties Served] : {}\n",
        snapshot.stats.parties_served
    ));
    out.push_str(&format!(
        "[All Time Served] : {} seconds",
        snapshot.stats.total_time_served_secs
    ));

    out
}

fn format_outcome(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::Completed {
            party_id,
            slot_id,
            duration_secs,
        } => format!("Party {party_id}: completed in dungeon {slot_id} ({duration_secs}s)"),
        RunOutcome::Cancelled {
            party_id,
            slot_id,
            elapsed_secs,
        } => format!(
            "Party {party_id}: cancelled in dungeon {slot_id} after {elapsed_secs}s (not credited)"
        ),
        RunOutcome::NotAdmitted { party_id } => {
            format!("Party {party_id}: not admitted before the deadline")
        }
    }
}

fn format_leftovers(leftovers: &LeftoverPlayers) -> String {
    format!(
        "Tank Players Left: {}\nHealer Players Left: {}\nDPS Players Left: {}",
        leftovers.tanks, leftovers.healers, leftovers.dps
    )
}

pub fn format_final_report(config: &SimConfig, report: &FinalReport) -> String {
    let mut out = String::new();

    out.push_str(&format_input_summary(config));
    out.push_str("\n\n");

    out.push_str("---------------- Final Dungeon Status ----------------\n");
    out.push_str(&format_snapshot(&report.snapshot));
    out.push_str("\n\n");

    out.push_str("------------------- Party Outcomes -------------------\n");
    out.push_str(&format!("Parties Formed: {}\n", report.parties_formed));
    for outcome in &report.outcomes {
        out.push_str(&format_outcome(outcome));
        out.push('\n');
    }
    for party in &report.unserved {
        out.push_str(&format!("Unserved: {party}\n"));
    }
    if report.deadline_expired {
        out.push_str(&format!(
            "Deadline of {}s expired before every party finished.\n",
            config.deadline_secs
        ));
    }
    out.push('\n');

    out.push_str("------------------ Leftover Players ------------------\n");
    out.push_str(&format_leftovers(&report.leftovers));
    out.push('\n');
    out.push_str(RULE);

    out
}
