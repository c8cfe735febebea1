use std::{process, sync::Arc};

use sleekblog::{
    application::{
        error::AppError,
        service::{BlogService, ListingLimits},
        source::ContentSource,
    },
    cache::CacheConfig,
    cms::CmsClient,
    config::{self, Command, Settings},
    domain::media::MediaResolver,
    infra::{error::InfraError, telemetry},
    presentation::{text, views},
    search::{SearchSession, SearchState},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Dispatch, Level, debug, dispatcher, error};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let chain = error.chain();
    if dispatcher::has_been_set() {
        error!(error = %error, chain = ?chain, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, chain = ?chain, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;
    telemetry::init(&settings.logging)?;

    let client = CmsClient::from_settings(&settings.cms)?;
    debug!(
        origin = %settings.cms.origin,
        api = %client.base(),
        command = ?cli_args.command,
        "CMS client ready"
    );

    let source: Arc<dyn ContentSource> = Arc::new(client);
    let service = BlogService::new(
        source,
        CacheConfig::from(&settings.cache),
        ListingLimits::from(&settings),
    );
    let media = MediaResolver::new(
        settings.cms.origin.as_str(),
        settings.cms.placeholder_image.clone(),
    );

    let output = match cli_args.command {
        Command::Home => text::listing(&views::home_page(&service.home().await, &media)),
        Command::Latest { limit } => text::listing(&views::home_page(
            &service.latest_posts(limit).await,
            &media,
        )),
        Command::Post { slug } => text::post(&views::post_page(&service.post(&slug).await, &media)),
        Command::Category { slug } => text::listing(&views::category_page(
            &slug,
            &service.category_posts(&slug).await,
            &media,
        )),
        Command::Author { id } => {
            text::listing(&views::author_page(&service.author_posts(id).await, &media))
        }
        Command::Tag { slug } => text::listing(&views::tag_page(
            &slug,
            &service.tag_posts(&slug).await,
            &media,
        )),
        Command::Categories => text::categories(&views::category_nav(&service.categories().await)),
        Command::Search { query } => return run_search(&service, &settings, &media, query).await,
    };

    print!("{output}");
    Ok(())
}

async fn run_search(
    service: &BlogService,
    settings: &Settings,
    media: &MediaResolver,
    query: Option<String>,
) -> Result<(), AppError> {
    let corpus_state = service.search_corpus().await;
    let render =
        |state: &SearchState| text::search(&views::search_page(&corpus_state, state, media));

    let Some(corpus) = corpus_state.value().cloned() else {
        print!("{}", render(&SearchState::Idle));
        return Ok(());
    };
    let session = SearchSession::new(settings.search.debounce, corpus);

    if let Some(query) = query {
        session.set_query(query);
        print!("{}", render(&session.settled().await));
        return Ok(());
    }

    // Interactive: every stdin line replaces the query, as keystrokes would.
    print!("{}", render(&session.state()));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut updates = session.subscribe();
    let mut printed = session.snapshot().generation;

    loop {
        tokio::select! {
            line = lines.next_line() => match line.map_err(InfraError::from)? {
                Some(line) => session.set_query(line),
                None => break,
            },
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if !snapshot.state.is_pending() && snapshot.generation != printed {
                    printed = snapshot.generation;
                    print!("{}", render(&snapshot.state));
                }
            }
        }
    }

    session.settled().await;
    let snapshot = session.snapshot();
    if snapshot.generation != printed {
        print!("{}", render(&snapshot.state));
    }
    Ok(())
}
