use crate::infra::TracingTransport;
use clap::Args;
use kinder_admin::error::AppError;
use kinder_admin::workflows::admissions::{
    AdmissionService, AdmissionSettings, InMemorySchoolRecords, NotificationRequest,
    NotificationStatus, SchoolDirectories, StudentApplicationRequest, ALL_GUARDIANS,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// School name used in notification templates.
    #[arg(long)]
    pub(crate) school_name: Option<String>,
    /// Skip the closing broadcast to every guardian.
    #[arg(long)]
    pub(crate) skip_broadcast: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        school_name,
        skip_broadcast,
    } = args;

    let mut settings = AdmissionSettings::default();
    if let Some(name) = school_name {
        settings.school_name = name;
    }

    let records = Arc::new(InMemorySchoolRecords::default());
    let transport = Arc::new(TracingTransport::default());
    let service = AdmissionService::new(records.clone(), transport.clone(), settings);

    println!("Admissions demo");

    println!("\nIntake");
    let accepted = service.submit(demo_request("Ana Ruiz", "ana.g@test.com", "grade-kg1"))?;
    println!("- Received {} for {}", accepted.id.0, accepted.student_name);
    let rejected = service.submit(demo_request(
        "Mateo Gómez",
        "carlos.g@test.com",
        "grade-pk",
    ))?;
    println!("- Received {} for {}", rejected.id.0, rejected.student_name);

    let mut malformed = demo_request("Sin Peso", "sin.peso@test.com", "grade-kg2");
    malformed.weight = -1.0;
    match service.submit(malformed) {
        Ok(application) => println!("- Unexpectedly stored {}", application.id.0),
        Err(err) => println!("- Rejected at intake: {err}"),
    }

    println!("\nPending applications");
    for summary in service.pending()? {
        println!(
            "- {} | {} | guardian {} | {}",
            summary.id.0, summary.student_name, summary.guardian_name, summary.grade_id.0
        );
    }

    println!("\nDecisions");
    let outcome = service.accept(&accepted.id)?;
    println!(
        "- Accepted {} -> student {} / guardian {} ({})",
        outcome.application_id.0,
        outcome.student.id.0,
        outcome.guardian.id.0,
        describe(&outcome.notification)
    );

    let outcome = service.reject(&rejected.id)?;
    println!(
        "- Rejected {} for {} ({})",
        outcome.application_id.0,
        outcome.student_name,
        describe(&outcome.notification)
    );

    match service.accept(&accepted.id) {
        Ok(_) => println!("- Second acceptance unexpectedly succeeded"),
        Err(err) => println!("- Second acceptance of {}: {err}", accepted.id.0),
    }

    if !skip_broadcast {
        println!("\nBroadcast");
        match service.notify(NotificationRequest::new(
            vec![ALL_GUARDIANS.to_string()],
            "Reunión de padres",
            "Les esperamos el viernes a las 8:00 en el salón principal.",
        )) {
            Ok(receipt) => println!("- Delivered to {}", receipt.recipients.join(", ")),
            Err(err) => println!("- Broadcast failed: {err}"),
        }
    }

    println!("\nEnrollment");
    println!("- {} student(s)", service.students()?.len());
    println!("- {} guardian(s)", service.guardians()?.len());

    println!("\nOutbox");
    for message in transport.outbox() {
        println!("- [{}] -> {}", message.subject, message.to.join(", "));
    }

    Ok(())
}

pub(crate) fn print_directories() {
    let directories = SchoolDirectories::standard();

    println!("Grades");
    for grade in directories.grades.list() {
        println!("- {}: {}", grade.id.0, grade.name);
    }

    println!("\nGuardian types");
    for guardian_type in directories.guardian_types.list() {
        println!("- {}: {}", guardian_type.id.0, guardian_type.name);
    }

    println!("\nBlood types");
    let labels: Vec<&str> = directories
        .blood_types()
        .iter()
        .map(|option| option.label)
        .collect();
    println!("- {}", labels.join(", "));
}

fn describe(status: &NotificationStatus) -> String {
    match status {
        NotificationStatus::Delivered { recipients } => {
            format!("notified {}", recipients.join(", "))
        }
        NotificationStatus::Failed { message } => format!("notification failed: {message}"),
    }
}

fn demo_request(student_name: &str, email: &str, grade_id: &str) -> StudentApplicationRequest {
    StudentApplicationRequest {
        student_name: student_name.to_string(),
        birth_date: "2020-05-18".to_string(),
        birth_place: "Medellín".to_string(),
        department: "Antioquia".to_string(),
        student_document: "1000000001".to_string(),
        weight: 17.0,
        height: 103.0,
        blood_type: "O+".to_string(),
        social_security: "SURA".to_string(),
        allergies: Vec::new(),
        grade_id: grade_id.to_string(),
        guardian_name: format!("Acudiente de {student_name}"),
        guardian_document: "43000000".to_string(),
        phone: "+57 300 000 0000".to_string(),
        profession: "Docente".to_string(),
        company: "Independiente".to_string(),
        email: email.to_string(),
        address: "Calle 1 # 2-3".to_string(),
        type_id: "2".to_string(),
    }
}
